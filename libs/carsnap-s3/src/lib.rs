//! # carsnap S3 adapter
//!
//! Bucket-backed implementation of the `BlobStore` port. Works against AWS S3
//! and S3-compatible stores (MinIO, Cloudflare R2) through `aws-sdk-s3`.

pub mod infrastructure;

pub use infrastructure::{S3BlobStore, S3BlobStoreConfig, S3ConfigError};
