//! Folder-backed blob store
//!
//! Photos are written to `{root}/{folder}/{file_name}` and exposed through
//! `{public_base_url}/{folder}/{file_name}`, with the gateway serving `root`
//! at that base URL.

use std::path::{Path, PathBuf};

use carsnap_domain::{ports::BlobStore, upload::UploadError};
use tracing::{debug, error, info, info_span, Instrument};

/// BlobStore writing photos into a named folder on the local filesystem
#[derive(Debug, Clone)]
pub struct FolderBlobStore {
    root: PathBuf,
    folder: String,
    public_base_url: String,
}

impl FolderBlobStore {
    /// Create a store for `root/folder`, publicly reachable under `public_base_url`
    ///
    /// Nothing is created until the first `store`.
    pub fn new(
        root: impl Into<PathBuf>,
        folder: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let store = Self {
            root: root.into(),
            folder: folder.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        };
        info!(
            root = %store.root.display(),
            folder = %store.folder,
            public_base_url = %store.public_base_url,
            "Initializing FolderBlobStore"
        );
        store
    }

    /// Directory served publicly
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the photos are written to
    pub fn folder_path(&self) -> PathBuf {
        self.root.join(&self.folder)
    }

    /// Public URL of a stored file
    pub fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url,
            urlencoding::encode(&self.folder),
            urlencoding::encode(file_name)
        )
    }

    /// Map one of this store's URLs back to the file on disk
    ///
    /// Returns `None` for URLs of other stores or names that would escape the folder.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(&self.public_base_url)?.strip_prefix('/')?;
        let (folder, file_name) = rest.split_once('/')?;
        let folder = urlencoding::decode(folder).ok()?;
        let file_name = urlencoding::decode(file_name).ok()?;

        if *folder != *self.folder || !is_plain_file_name(&file_name) {
            return None;
        }
        Some(self.folder_path().join(&*file_name))
    }

    /// Read a stored photo back by its public URL
    pub async fn read(&self, url: &str) -> Result<Vec<u8>, UploadError> {
        let path = self
            .resolve(url)
            .ok_or_else(|| UploadError::storage(format!("URL '{}' is not served by this store", url)))?;

        tokio::fs::read(&path).await.map_err(|err| {
            UploadError::storage(format!("Failed to read '{}': {}", path.display(), err))
        })
    }

    /// Find or create the folder
    ///
    /// `create_dir_all` succeeds when the directory already exists, including
    /// when a concurrent request created it first.
    async fn ensure_folder(&self) -> Result<PathBuf, UploadError> {
        let path = self.folder_path();
        tokio::fs::create_dir_all(&path).await.map_err(|err| {
            error!(path = %path.display(), error = %err, "Failed to create photo folder");
            UploadError::storage(format!(
                "Failed to create folder '{}': {}",
                self.folder, err
            ))
        })?;
        Ok(path)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}

#[cfg(unix)]
async fn grant_public_read(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).await
}

#[cfg(not(unix))]
async fn grant_public_read(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl BlobStore for FolderBlobStore {
    fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl std::future::Future<Output = Result<String, UploadError>> + Send {
        let file_name = file_name.to_string();
        let data = bytes.to_vec();
        let mime_type = mime_type.to_string();
        let span = info_span!("folder_store", folder = %self.folder, size = data.len());

        async move {
            if !is_plain_file_name(&file_name) {
                return Err(UploadError::storage(format!(
                    "Invalid file name '{}'",
                    file_name
                )));
            }

            let path = self.ensure_folder().await?.join(&file_name);
            debug!(path = %path.display(), mime_type = %mime_type, "Writing photo");

            tokio::fs::write(&path, &data).await.map_err(|err| {
                error!(path = %path.display(), error = %err, "Failed to write photo");
                UploadError::storage(format!("Failed to write '{}': {}", file_name, err))
            })?;

            grant_public_read(&path).await.map_err(|err| {
                error!(path = %path.display(), error = %err, "Failed to grant public read");
                UploadError::storage(format!(
                    "Failed to share '{}' publicly: {}",
                    file_name, err
                ))
            })?;

            let url = self.public_url(&file_name);
            info!(path = %path.display(), url = %url, "Stored photo");
            Ok(url)
        }
        .instrument(span)
    }
}
