//! S3 Blob Store Implementation
//!
//! This module implements the `BlobStore` port using an S3 bucket as the
//! container. It handles all S3 operations and converts AWS errors to domain errors.

use aws_sdk_s3::{
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl},
    Client,
};
use bytes::Bytes;
use carsnap_domain::{ports::BlobStore, upload::UploadError};
use thiserror::Error;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

/// Invalid S3 blob store settings
#[derive(Error, Debug, PartialEq, Eq)]
pub enum S3ConfigError {
    #[error("S3 bucket name must not be empty")]
    EmptyBucket,

    #[error("S3 public URL template must not be empty")]
    EmptyPublicUrl,
}

/// Settings for [`S3BlobStore`]
#[derive(Debug, Clone)]
pub struct S3BlobStoreConfig {
    bucket: String,
    public_url_template: String,
    public_acl: bool,
}

impl S3BlobStoreConfig {
    /// Create a config for `bucket`
    ///
    /// `public_url_template` is the public address of the bucket. It may contain
    /// `{bucket}` and `{key}` placeholders; without `{key}` the object key is
    /// appended after a `/` (e.g. `https://pub-1234.r2.dev`).
    pub fn new(
        bucket: impl Into<String>,
        public_url_template: impl Into<String>,
    ) -> Result<Self, S3ConfigError> {
        let bucket = bucket.into().trim().to_string();
        let public_url_template = public_url_template.into().trim().to_string();

        if bucket.is_empty() {
            return Err(S3ConfigError::EmptyBucket);
        }
        if public_url_template.is_empty() {
            return Err(S3ConfigError::EmptyPublicUrl);
        }

        Ok(Self {
            bucket,
            public_url_template,
            public_acl: true,
        })
    }

    /// Whether objects are written with the `public-read` canned ACL
    ///
    /// Buckets that enforce owner-only ACLs (and R2) reject ACL headers;
    /// disable this when public access is granted at the bucket level.
    pub fn with_public_acl(mut self, public_acl: bool) -> Self {
        self.public_acl = public_acl;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of the object stored under `key`
    pub fn public_url(&self, key: &str) -> String {
        let key = urlencoding::encode(key);
        let url = self.public_url_template.replace("{bucket}", &self.bucket);

        if url.contains("{key}") {
            url.replace("{key}", &key)
        } else {
            format!("{}/{}", url.trim_end_matches('/'), key)
        }
    }
}

/// S3-based implementation of the BlobStore port
///
/// The bucket is the container: it is looked up on every store and created when
/// missing. Objects are stored flat at the bucket root under their file name.
///
/// ## Error Handling
///
/// All AWS SDK errors are converted to `UploadError::Storage` with the bucket
/// and key in the message.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    config: S3BlobStoreConfig,
}

impl S3BlobStore {
    /// Create a new S3 blob store
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use carsnap_s3::{S3BlobStore, S3BlobStoreConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    /// let store = S3BlobStore::new(
    ///     Client::new(&config),
    ///     S3BlobStoreConfig::new("car-photos", "https://pub-1234.r2.dev")?,
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(client: Client, config: S3BlobStoreConfig) -> Self {
        info!(bucket = %config.bucket, public_acl = config.public_acl, "Initializing S3BlobStore");
        Self { client, config }
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Find the bucket, creating it when absent
    ///
    /// Losing a creation race to another request is not an error: the bucket
    /// exists either way.
    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn ensure_bucket(&self) -> Result<(), UploadError> {
        let bucket = &self.config.bucket;

        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => {
                debug!("Bucket exists");
                return Ok(());
            }
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                if !missing {
                    error!(error = %DisplayErrorContext(&err), "Failed to look up bucket");
                    return Err(UploadError::storage(format!(
                        "S3 head_bucket failed for bucket '{}': {}",
                        bucket,
                        DisplayErrorContext(&err)
                    )));
                }
            }
        }

        info!("Bucket not found, creating it");
        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(constraint) = self.location_constraint() {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!("Created bucket");
                Ok(())
            }
            Err(err) => {
                let raced = err
                    .as_service_error()
                    .map(|e| e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists())
                    .unwrap_or(false);
                if raced {
                    warn!("Bucket was created concurrently, reusing it");
                    Ok(())
                } else {
                    error!(error = %DisplayErrorContext(&err), "Failed to create bucket");
                    Err(UploadError::storage(format!(
                        "S3 create_bucket failed for bucket '{}': {}",
                        bucket,
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }

    /// us-east-1 (and S3-compatible "auto" regions) reject an explicit constraint
    fn location_constraint(&self) -> Option<BucketLocationConstraint> {
        let region = self.client.config().region()?.as_ref().to_string();
        match region.as_str() {
            "us-east-1" | "auto" => None,
            other => Some(BucketLocationConstraint::from(other)),
        }
    }
}

impl BlobStore for S3BlobStore {
    fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl std::future::Future<Output = Result<String, UploadError>> + Send {
        let key = file_name.to_string();
        let content_type = mime_type.to_string();
        let data = Bytes::copy_from_slice(bytes);
        let span = info_span!("s3_store", bucket = %self.config.bucket, size = data.len());

        async move {
            self.ensure_bucket().await?;

            debug!(key = %key, content_type = %content_type, "Uploading photo to S3");

            let mut request = self
                .client
                .put_object()
                .bucket(&self.config.bucket)
                .key(&key)
                .content_type(content_type)
                .body(ByteStream::from(data));
            if self.config.public_acl {
                request = request.acl(ObjectCannedAcl::PublicRead);
            }

            match request.send().await {
                Ok(_) => {
                    let url = self.config.public_url(&key);
                    info!(key = %key, url = %url, "Successfully uploaded photo to S3");
                    Ok(url)
                }
                Err(err) => {
                    error!(key = %key, error = %DisplayErrorContext(&err), "Failed to upload photo to S3");
                    Err(UploadError::storage(format!(
                        "S3 put_object failed for key '{}': {}",
                        key,
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
        .instrument(span)
    }
}
