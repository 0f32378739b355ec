//! # carsnap Domain Layer
//!
//! Pure business logic for the carsnap photo upload service. It follows the
//! hexagonal architecture used across the workspace:
//!
//! - **Entities**: upload requests, validated submissions, sheet records
//! - **Ports**: `BlobStore` and `RecordSink` traits for external storage
//! - **Services**: `UploadService`, the validate → store → append workflow
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (S3, filesystem, HTTP).
//! Adapters in `carsnap-s3` and `carsnap-local` implement the ports; the gateway
//! app wires them together.
//!
//! ## Example
//!
//! ```rust
//! use carsnap_domain::ports::{BlobStore, RecordSink};
//! use carsnap_domain::upload::{UploadRequest, UploadService};
//!
//! async fn example<B: BlobStore, S: RecordSink>(service: UploadService<B, S>) {
//!     let result = service.handle(UploadRequest::default()).await;
//!     assert!(!result.is_success());
//! }
//! ```

pub mod ports;
pub mod upload;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use ports::{BlobStore, RecordSink};
pub use upload::{
    CarRecord, CarSubmission, Difficulty, ImagePayload, StoredPhoto, UploadConfig, UploadError,
    UploadRequest, UploadResult, UploadService,
};
