//! Ports (trait definitions) for external dependencies
//!
//! The domain defines what it needs from storage; the infrastructure crates
//! provide implementations (S3 bucket, local folder, CSV sheet).
//!
//! ## Static Dispatch
//!
//! We use native Rust async traits with `impl Future` return types instead of
//! `async_trait`, so every adapter is monomorphized into the service.

use std::future::Future;
use std::sync::Arc;

use crate::upload::UploadError;

/// Port for blob storage
///
/// A blob store persists binary content under a name inside a named container
/// (folder, bucket) and yields a publicly fetchable URL.
///
/// Implementations must:
/// 1. Find the container by name, creating it when absent. This is a single
///    idempotent step; concurrent callers may race to create it and the store
///    must converge on a usable container rather than fail.
/// 2. Write the bytes under `file_name`.
/// 3. Grant public read access.
/// 4. Return the public URL, only once the write is confirmed.
///
/// Any failure is reported as `UploadError::Storage`.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` as `file_name` with the given content type, returning its public URL
    fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<String, UploadError>> + Send;
}

/// Port for the tabular record destination (the "sheet")
///
/// Appends exactly one ordered row at the end of the destination. The sink must
/// NOT create the destination: if it does not exist, `append` fails with
/// `UploadError::sheet_not_found`.
pub trait RecordSink: Send + Sync {
    /// Append one row of fields, in order
    fn append(&self, row: &[String]) -> impl Future<Output = Result<(), UploadError>> + Send;
}

impl<T: BlobStore> BlobStore for Arc<T> {
    fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<String, UploadError>> + Send {
        (**self).store(file_name, bytes, mime_type)
    }
}

impl<T: RecordSink> RecordSink for Arc<T> {
    fn append(&self, row: &[String]) -> impl Future<Output = Result<(), UploadError>> + Send {
        (**self).append(row)
    }
}
