//! Domain entities for photo uploads
//!
//! An upload lives for exactly one request: it is parsed from the transport into
//! an `UploadRequest`, validated into a `CarSubmission`, stored, recorded as a
//! `CarRecord` row and answered with an `UploadResult`. Nothing is retained.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::upload::{UploadConfig, UploadError};

/// Category used when the client sends none
pub const DEFAULT_CATEGORY: &str = "toy";

/// Raw image content with the client's optional hints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePayload {
    /// The image bytes, already decoded from whatever transport encoding was used
    pub bytes: Vec<u8>,
    /// Declared content type, if any
    pub mime_type: Option<String>,
    /// Client-suggested file name, if any
    pub file_name: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: None,
            file_name: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Size of the image in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// An upload as parsed from any transport, before validation
///
/// Every field is optional here; `validate` decides what is required.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub image: Option<ImagePayload>,
    pub name_en: Option<String>,
    pub name_vi: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

impl UploadRequest {
    /// Check required fields and apply defaults
    ///
    /// # Errors
    ///
    /// - `UploadError::Validation("Missing required fields")` when the image is
    ///   absent or empty, or any of `name_en`, `name_vi`, `color` is blank
    /// - `UploadError::Validation` when the image exceeds `max_image_bytes` or the
    ///   difficulty is not 1, 2 or 3
    pub fn validate(self, config: &UploadConfig) -> Result<CarSubmission, UploadError> {
        let image = self.image.filter(|image| !image.bytes.is_empty());
        let (Some(image), Some(name_en), Some(name_vi), Some(color)) = (
            image,
            non_blank(self.name_en),
            non_blank(self.name_vi),
            non_blank(self.color),
        ) else {
            return Err(UploadError::missing_fields());
        };

        check_image_size(&image, config.max_image_bytes)?;

        let category = non_blank(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let difficulty = match non_blank(self.difficulty) {
            Some(value) => value.parse()?,
            None => Difficulty::default(),
        };

        Ok(CarSubmission {
            image,
            name_en,
            name_vi,
            color,
            category,
            difficulty,
        })
    }
}

/// Reject images above the configured limit
pub(crate) fn check_image_size(image: &ImagePayload, max: usize) -> Result<(), UploadError> {
    if image.size() > max {
        return Err(UploadError::validation(format!(
            "Image size ({} bytes) exceeds maximum allowed ({} bytes)",
            image.size(),
            max
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// How hard the car is to recognize in the game, 1 to 3
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "1",
            Self::Medium => "2",
            Self::Hard => "3",
        }
    }
}

impl FromStr for Difficulty {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Easy),
            "2" => Ok(Self::Medium),
            "3" => Ok(Self::Hard),
            other => Err(UploadError::validation(format!(
                "Invalid difficulty '{}': expected 1, 2 or 3",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = UploadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated upload, ready to be stored
#[derive(Debug, Clone)]
pub struct CarSubmission {
    pub image: ImagePayload,
    pub name_en: String,
    pub name_vi: String,
    pub color: String,
    pub category: String,
    pub difficulty: Difficulty,
}

impl CarSubmission {
    /// Build the sheet record once the photo has a public URL
    pub fn record(&self, photo_url: impl Into<String>) -> CarRecord {
        CarRecord {
            name_en: self.name_en.clone(),
            name_vi: self.name_vi.clone(),
            photo_url: photo_url.into(),
            color: self.color.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
        }
    }
}

/// One row of the cars sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRecord {
    pub name_en: String,
    pub name_vi: String,
    pub photo_url: String,
    pub color: String,
    pub category: String,
    pub difficulty: Difficulty,
}

impl CarRecord {
    /// Column order: nameEn, nameVi, photoUrl, color, category, difficulty
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name_en.clone(),
            self.name_vi.clone(),
            self.photo_url.clone(),
            self.color.clone(),
            self.category.clone(),
            self.difficulty.to_string(),
        ]
    }
}

/// Where a photo ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub file_name: String,
    pub url: String,
}

/// Outcome of one upload request, always well-formed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Success {
        message: String,
        photo_url: String,
        file_name: String,
    },
    Failure {
        error: String,
    },
}

impl UploadResult {
    pub fn success(message: impl Into<String>, photo: StoredPhoto) -> Self {
        Self::Success {
            message: message.into(),
            photo_url: photo.url,
            file_name: photo.file_name,
        }
    }

    pub fn failure(err: &UploadError) -> Self {
        Self::Failure {
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Public URL of the stored photo, on success
    pub fn photo_url(&self) -> Option<&str> {
        match self {
            Self::Success { photo_url, .. } => Some(photo_url),
            Self::Failure { .. } => None,
        }
    }

    /// Error message, on failure
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> UploadRequest {
        UploadRequest {
            image: Some(ImagePayload::new(vec![0xFF, 0xD8, 0xFF, 0xD9])),
            name_en: Some("Fire Truck".to_string()),
            name_vi: Some("Xe cứu hỏa".to_string()),
            color: Some("red".to_string()),
            category: None,
            difficulty: None,
        }
    }

    #[test]
    fn test_validate_applies_defaults() {
        let submission = complete_request()
            .validate(&UploadConfig::default())
            .unwrap();

        assert_eq!(submission.category, "toy");
        assert_eq!(submission.difficulty, Difficulty::Easy);
        assert_eq!(submission.name_vi, "Xe cứu hỏa");
    }

    #[test]
    fn test_validate_rejects_each_missing_field() {
        let config = UploadConfig::default();
        let strip: [fn(&mut UploadRequest); 4] = [
            |r| r.image = None,
            |r| r.name_en = None,
            |r| r.name_vi = Some("   ".to_string()),
            |r| r.color = Some(String::new()),
        ];

        for strip_field in strip {
            let mut request = complete_request();
            strip_field(&mut request);
            let err = request.validate(&config).unwrap_err();
            assert_eq!(err, UploadError::missing_fields());
        }
    }

    #[test]
    fn test_validate_rejects_empty_image() {
        let mut request = complete_request();
        request.image = Some(ImagePayload::new(Vec::new()));

        let err = request.validate(&UploadConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[test]
    fn test_validate_rejects_oversized_image() {
        let config = UploadConfig {
            max_image_bytes: 2,
            ..UploadConfig::default()
        };

        let err = complete_request().validate(&config).unwrap_err();
        assert!(matches!(err, UploadError::Validation(_)));
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_validate_rejects_unknown_difficulty() {
        let mut request = complete_request();
        request.difficulty = Some("7".to_string());

        let err = request.validate(&UploadConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Invalid difficulty '7'"));
    }

    #[test]
    fn test_blank_optional_fields_fall_back_to_defaults() {
        let mut request = complete_request();
        request.category = Some(" ".to_string());
        request.difficulty = Some(String::new());

        let submission = request.validate(&UploadConfig::default()).unwrap();
        assert_eq!(submission.category, DEFAULT_CATEGORY);
        assert_eq!(submission.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("2".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" 3 ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("hard".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.to_string(), "2");
    }

    #[test]
    fn test_record_row_order() {
        let mut request = complete_request();
        request.category = Some("emergency".to_string());
        request.difficulty = Some("2".to_string());
        let submission = request.validate(&UploadConfig::default()).unwrap();

        let row = submission.record("https://example.com/p.jpg").to_row();

        assert_eq!(
            row,
            vec![
                "Fire Truck",
                "Xe cứu hỏa",
                "https://example.com/p.jpg",
                "red",
                "emergency",
                "2"
            ]
        );
    }

    #[test]
    fn test_upload_result_accessors() {
        let ok = UploadResult::success(
            "done",
            StoredPhoto {
                file_name: "1_a.jpg".to_string(),
                url: "https://example.com/1_a.jpg".to_string(),
            },
        );
        assert!(ok.is_success());
        assert_eq!(ok.photo_url(), Some("https://example.com/1_a.jpg"));
        assert_eq!(ok.error(), None);

        let failed = UploadResult::failure(&UploadError::missing_fields());
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some("Missing required fields"));
        assert_eq!(failed.photo_url(), None);
    }
}
