//! Domain errors for upload operations
//!
//! The `Display` output of every variant is the bare message: it is returned
//! verbatim to clients in the `error` field of a failed upload.

use thiserror::Error;

/// Message returned when any required field is absent
pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";

/// Errors that can occur while handling an upload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// A required field is missing or a value is out of range
    #[error("{0}")]
    Validation(String),

    /// The request body or its encoding is malformed
    #[error("{0}")]
    Transport(String),

    /// Writing the blob or granting public access failed
    #[error("{0}")]
    Storage(String),

    /// The sheet is missing or the append failed
    #[error("{0}")]
    RecordSink(String),
}

impl UploadError {
    /// The canonical "Missing required fields" validation error
    pub fn missing_fields() -> Self {
        Self::Validation(MISSING_REQUIRED_FIELDS.to_string())
    }

    /// Create a validation error with a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a transport error with a message
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a storage error with a message
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a record sink error with a message
    pub fn record_sink(msg: impl Into<String>) -> Self {
        Self::RecordSink(msg.into())
    }

    /// The destination sheet does not exist
    pub fn sheet_not_found(sheet: &str) -> Self {
        Self::RecordSink(format!("Sheet \"{}\" not found", sheet))
    }

    /// Whether the caller can fix this by resubmitting corrected input
    ///
    /// Transport errors count as validation failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Transport(_))
    }
}

/// Result type alias for upload operations
pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = UploadError::missing_fields();
        assert!(matches!(err, UploadError::Validation(_)));
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[test]
    fn test_sheet_not_found_message() {
        let err = UploadError::sheet_not_found("Cars");
        assert!(matches!(err, UploadError::RecordSink(_)));
        assert_eq!(err.to_string(), "Sheet \"Cars\" not found");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(UploadError::validation("bad").is_client_error());
        assert!(UploadError::transport("Invalid base64").is_client_error());
        assert!(!UploadError::storage("disk full").is_client_error());
        assert!(!UploadError::record_sink("append failed").is_client_error());
    }
}
