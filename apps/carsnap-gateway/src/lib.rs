//! carsnap gateway - HTTP front of the car photo upload service
//!
//! Accepts a photo and its metadata (JSON with base64, URL-encoded form or
//! multipart), stores the photo through a `BlobStore` and appends a row to the
//! cars sheet through a `RecordSink`.

pub mod backend;
pub mod config;
pub mod dto;
pub mod extract;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use carsnap_domain::upload::UploadService;

/// Application state shared across handlers
pub struct AppState<B, S> {
    pub upload_service: Arc<UploadService<B, S>>,
}

impl<B, S> AppState<B, S> {
    pub fn new(upload_service: UploadService<B, S>) -> Self {
        Self {
            upload_service: Arc::new(upload_service),
        }
    }
}

impl<B, S> Clone for AppState<B, S> {
    fn clone(&self) -> Self {
        Self {
            upload_service: Arc::clone(&self.upload_service),
        }
    }
}
