//! Infrastructure adapters backed by S3

mod s3_blob_store;

pub use s3_blob_store::{S3BlobStore, S3BlobStoreConfig, S3ConfigError};
