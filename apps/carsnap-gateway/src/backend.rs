//! Blob store selected at startup

use std::future::Future;
use std::path::Path;

use carsnap_domain::{ports::BlobStore, upload::UploadError};
use carsnap_local::FolderBlobStore;
use carsnap_s3::S3BlobStore;

/// The deployment's blob store, statically dispatched
#[derive(Clone)]
pub enum BlobBackend {
    Folder(FolderBlobStore),
    S3(S3BlobStore),
}

impl BlobBackend {
    /// Directory the gateway must serve for URLs to resolve, if any
    pub fn served_dir(&self) -> Option<&Path> {
        match self {
            Self::Folder(store) => Some(store.root()),
            Self::S3(_) => None,
        }
    }
}

impl BlobStore for BlobBackend {
    fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<String, UploadError>> + Send {
        async move {
            match self {
                Self::Folder(store) => store.store(file_name, bytes, mime_type).await,
                Self::S3(store) => store.store(file_name, bytes, mime_type).await,
            }
        }
    }
}
