//! Photo-only upload handler

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use carsnap_domain::ports::{BlobStore, RecordSink};
use tracing::{error, info, warn};

use crate::{dto::upload::UploadResponse, extract::parse_upload, AppState};

/// Store a photo and return its public URL, without touching the sheet
#[utoipa::path(
    post,
    path = "/photos",
    request_body(
        content = String,
        description = "Multipart form with a `photo` file part (JSON and URL-encoded bodies are accepted too)",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Photo stored", body = UploadResponse),
        (status = 400, description = "No photo provided or malformed body", body = UploadResponse),
        (status = 500, description = "Storage failure", body = UploadResponse)
    ),
    tag = "upload"
)]
pub async fn store_photo_handler<B, S>(
    State(state): State<AppState<B, S>>,
    request: Request,
) -> Response
where
    B: BlobStore + 'static,
    S: RecordSink + 'static,
{
    let upload = match parse_upload(request).await {
        Ok(upload) => upload,
        Err(err) => {
            warn!(error = %err, "Rejected malformed photo upload");
            return (StatusCode::BAD_REQUEST, Json(UploadResponse::from(&err))).into_response();
        }
    };

    match state.upload_service.store_photo(upload.image).await {
        Ok(photo) => {
            info!(file_name = %photo.file_name, "Photo stored");
            (StatusCode::OK, Json(UploadResponse::stored(photo))).into_response()
        }
        Err(err) => {
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error!(error = %err, status = %status, "Photo upload failed");
            (status, Json(UploadResponse::from(&err))).into_response()
        }
    }
}
