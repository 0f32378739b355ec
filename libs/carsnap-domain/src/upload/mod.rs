//! Upload domain module
//!
//! Everything needed to turn one incoming photo submission into a stored blob
//! and a sheet row.

mod entity;
mod error;
pub mod naming;
mod service;

pub use entity::{
    CarRecord, CarSubmission, Difficulty, ImagePayload, StoredPhoto, UploadRequest, UploadResult,
};
pub use error::{Result, UploadError};
pub use service::{UploadConfig, UploadService};
