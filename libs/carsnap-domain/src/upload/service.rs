//! Upload service - Business logic orchestration
//!
//! Coordinates validation, file naming and the two storage ports. Every
//! operation is one linear pass: validate → store blob → append row.

use chrono::Utc;
use tracing::{error, info, instrument};

use super::entity::check_image_size;
use super::naming::{build_file_name, effective_mime};
use super::{ImagePayload, StoredPhoto, UploadError, UploadRequest, UploadResult};
use crate::ports::{BlobStore, RecordSink};

/// Configuration for the upload service
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum accepted image size in bytes (default: 10MB)
    pub max_image_bytes: usize,
    /// Message returned with a successful upload
    pub success_message: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024, // 10MB
            success_message: "Car added successfully!".to_string(),
        }
    }
}

/// Service handling car photo uploads
///
/// Generic over the blob store and the record sink so that each deployment
/// picks its own adapters and tests can inject in-memory fakes.
pub struct UploadService<B, S> {
    blob_store: B,
    record_sink: S,
    config: UploadConfig,
}

impl<B, S> UploadService<B, S>
where
    B: BlobStore,
    S: RecordSink,
{
    /// Create a new UploadService with the given adapters and configuration
    pub fn new(blob_store: B, record_sink: S, config: UploadConfig) -> Self {
        Self {
            blob_store,
            record_sink,
            config,
        }
    }

    /// Create a new UploadService with default configuration
    pub fn with_adapters(blob_store: B, record_sink: S) -> Self {
        Self::new(blob_store, record_sink, UploadConfig::default())
    }

    /// Handle one upload, never failing
    ///
    /// Any error from `submit` is logged and turned into `UploadResult::Failure`.
    pub async fn handle(&self, request: UploadRequest) -> UploadResult {
        match self.submit(request).await {
            Ok(photo) => UploadResult::success(self.config.success_message.clone(), photo),
            Err(err) => {
                error!(error = %err, "Upload failed");
                UploadResult::failure(&err)
            }
        }
    }

    /// Validate, store the photo, then append the sheet row
    ///
    /// Nothing touches storage before validation passes. If the append fails
    /// the stored blob is left in place.
    ///
    /// # Errors
    ///
    /// - `UploadError::Validation` for missing or invalid fields
    /// - `UploadError::Storage` if the blob store fails
    /// - `UploadError::RecordSink` if the sheet is missing or the append fails
    #[instrument(skip_all)]
    pub async fn submit(&self, request: UploadRequest) -> Result<StoredPhoto, UploadError> {
        let submission = request.validate(&self.config)?;

        let mime = effective_mime(submission.image.mime_type.as_deref(), &submission.image.bytes);
        let file_name = build_file_name(
            Utc::now().timestamp_millis(),
            Some(&submission.name_en),
            submission.image.file_name.as_deref(),
            &mime,
        );

        info!(
            file_name = %file_name,
            mime = %mime,
            size = submission.image.size(),
            "Storing car photo"
        );
        let url = self
            .blob_store
            .store(&file_name, &submission.image.bytes, &mime)
            .await?;

        let record = submission.record(url.clone());
        self.record_sink.append(&record.to_row()).await?;

        info!(file_name = %file_name, photo_url = %url, "Car photo recorded");
        Ok(StoredPhoto { file_name, url })
    }

    /// Store a photo without recording it in the sheet
    ///
    /// The name is built from the client's file name (if any) and the timestamp.
    ///
    /// # Errors
    ///
    /// - `UploadError::Validation` if no image bytes were sent or the image is too large
    /// - `UploadError::Storage` if the blob store fails
    #[instrument(skip_all)]
    pub async fn store_photo(&self, image: Option<ImagePayload>) -> Result<StoredPhoto, UploadError> {
        let image = image
            .filter(|image| !image.bytes.is_empty())
            .ok_or_else(|| UploadError::validation("No photo provided"))?;
        check_image_size(&image, self.config.max_image_bytes)?;

        let mime = effective_mime(image.mime_type.as_deref(), &image.bytes);
        let file_name = build_file_name(
            Utc::now().timestamp_millis(),
            None,
            image.file_name.as_deref(),
            &mime,
        );

        let url = self.blob_store.store(&file_name, &image.bytes, &mime).await?;

        info!(file_name = %file_name, photo_url = %url, "Photo stored");
        Ok(StoredPhoto { file_name, url })
    }

    /// Get the service configuration
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryBlobStore, InMemoryRecordSink};
    use std::sync::Arc;

    /// Smallest JPEG-looking payload: SOI, APP0 header start, EOI
    const MINIMAL_JPEG: [u8; 17] = [
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
        0xFF, 0xD9,
    ];

    type TestService = UploadService<Arc<InMemoryBlobStore>, Arc<InMemoryRecordSink>>;

    fn service() -> (TestService, Arc<InMemoryBlobStore>, Arc<InMemoryRecordSink>) {
        let blobs = Arc::new(InMemoryBlobStore::new("My Cars Photos"));
        let sheet = Arc::new(InMemoryRecordSink::with_sheet("Cars"));
        let service = UploadService::with_adapters(blobs.clone(), sheet.clone());
        (service, blobs, sheet)
    }

    fn fire_truck() -> UploadRequest {
        UploadRequest {
            image: Some(ImagePayload::new(MINIMAL_JPEG.to_vec())),
            name_en: Some("Fire Truck".to_string()),
            name_vi: Some("Xe cứu hỏa".to_string()),
            color: Some("red".to_string()),
            category: Some("emergency".to_string()),
            difficulty: Some("2".to_string()),
        }
    }

    #[tokio::test]
    async fn test_fire_truck_upload_success() {
        let (service, _blobs, sheet) = service();

        let result = service.handle(fire_truck()).await;

        assert!(result.is_success());
        let url = result.photo_url().unwrap().to_string();
        assert!(!url.is_empty());
        assert_eq!(
            sheet.rows("Cars"),
            vec![vec![
                "Fire Truck".to_string(),
                "Xe cứu hỏa".to_string(),
                url,
                "red".to_string(),
                "emergency".to_string(),
                "2".to_string(),
            ]]
        );
    }

    #[tokio::test]
    async fn test_success_message_is_returned() {
        let (service, _, _) = service();

        match service.handle(fire_truck()).await {
            UploadResult::Success {
                message, file_name, ..
            } => {
                assert_eq!(message, "Car added successfully!");
                assert!(file_name.ends_with("_Fire_Truck.jpg"));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_touch_no_storage() {
        let (service, blobs, sheet) = service();

        for request in [
            UploadRequest {
                image: None,
                ..fire_truck()
            },
            UploadRequest {
                name_en: None,
                ..fire_truck()
            },
            UploadRequest {
                name_vi: None,
                ..fire_truck()
            },
            UploadRequest {
                color: None,
                ..fire_truck()
            },
        ] {
            let result = service.handle(request).await;
            assert_eq!(result.error(), Some("Missing required fields"));
        }

        assert_eq!(blobs.store_calls(), 0);
        assert_eq!(sheet.append_calls(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_through_returned_url() {
        let (service, blobs, _) = service();

        let photo = service.submit(fire_truck()).await.unwrap();

        assert_eq!(blobs.fetch(&photo.url).unwrap(), MINIMAL_JPEG.to_vec());
        assert_eq!(blobs.content_type(&photo.url).as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_two_calls_share_one_container_and_sheet() {
        let (service, blobs, sheet) = service();

        service.submit(fire_truck()).await.unwrap();
        service
            .submit(UploadRequest {
                name_en: Some("Police Car".to_string()),
                ..fire_truck()
            })
            .await
            .unwrap();

        assert_eq!(blobs.container_count(), 1);
        assert_eq!(blobs.containers_created(), 1);
        assert_eq!(blobs.blob_count(), 2);
        assert_eq!(sheet.sheet_count(), 1);
        assert_eq!(sheet.rows("Cars").len(), 2);
    }

    #[tokio::test]
    async fn test_sink_failure_keeps_stored_blob() {
        let blobs = Arc::new(InMemoryBlobStore::new("My Cars Photos"));
        let sheet = Arc::new(InMemoryRecordSink::failing("Cars", "quota exceeded"));
        let service = UploadService::with_adapters(blobs.clone(), sheet.clone());

        let result = service.handle(fire_truck()).await;

        assert_eq!(result.error(), Some("quota exceeded"));
        assert_eq!(blobs.store_calls(), 1);
        assert_eq!(blobs.blob_count(), 1, "the stored photo must not be cleaned up");
    }

    #[tokio::test]
    async fn test_missing_sheet_is_reported() {
        let blobs = Arc::new(InMemoryBlobStore::new("My Cars Photos"));
        let sheet = Arc::new(InMemoryRecordSink::without_sheet("Cars"));
        let service = UploadService::with_adapters(blobs, sheet.clone());

        let err = service.submit(fire_truck()).await.unwrap_err();

        assert_eq!(err, UploadError::sheet_not_found("Cars"));
        assert_eq!(sheet.sheet_count(), 0, "the sink must not create the sheet");
    }

    #[tokio::test]
    async fn test_storage_failure_skips_sheet() {
        let blobs = Arc::new(InMemoryBlobStore::failing("My Cars Photos", "bucket unreachable"));
        let sheet = Arc::new(InMemoryRecordSink::with_sheet("Cars"));
        let service = UploadService::with_adapters(blobs, sheet.clone());

        let err = service.submit(fire_truck()).await.unwrap_err();

        assert!(matches!(err, UploadError::Storage(_)));
        assert_eq!(sheet.append_calls(), 0);
    }

    #[tokio::test]
    async fn test_store_photo_skips_sheet() {
        let (service, blobs, sheet) = service();
        let image = ImagePayload::new(MINIMAL_JPEG.to_vec()).with_file_name("truck.jpeg");

        let photo = service.store_photo(Some(image)).await.unwrap();

        assert!(photo.file_name.ends_with("_truck.jpg"));
        assert_eq!(blobs.fetch(&photo.url).unwrap(), MINIMAL_JPEG.to_vec());
        assert_eq!(sheet.append_calls(), 0);
    }

    #[tokio::test]
    async fn test_store_photo_requires_image() {
        let (service, blobs, _) = service();

        let err = service.store_photo(None).await.unwrap_err();

        assert_eq!(err.to_string(), "No photo provided");
        assert_eq!(blobs.store_calls(), 0);
    }

    #[tokio::test]
    async fn test_declared_mime_drives_extension() {
        let (service, blobs, _) = service();
        let mut request = fire_truck();
        request.image = Some(ImagePayload::new(vec![1, 2, 3]).with_mime_type("image/png"));

        let photo = service.submit(request).await.unwrap();

        assert!(photo.file_name.ends_with(".png"));
        assert_eq!(blobs.content_type(&photo.url).as_deref(), Some("image/png"));
    }
}
