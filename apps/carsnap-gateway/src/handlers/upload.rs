//! Upload handler

use axum::{
    extract::{Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use carsnap_domain::{
    ports::{BlobStore, RecordSink},
    upload::UploadResult,
};
use tracing::{info, warn};

use crate::{
    dto::upload::UploadResponse,
    extract::parse_upload,
    AppState,
};

/// Upload a car photo and record it in the sheet
///
/// Always answers 200: clients on constrained platforms can only read the
/// body, so success or failure is reported in `success`.
#[utoipa::path(
    post,
    path = "/",
    request_body(
        content = UploadJsonRequest,
        description = "JSON (any content type but the two form types), URL-encoded form with `fileData`, or multipart with a `photo` file part"
    ),
    responses(
        (status = 200, description = "Upload outcome; check `success`", body = UploadResponse)
    ),
    tag = "upload"
)]
pub async fn upload_handler<B, S>(
    State(state): State<AppState<B, S>>,
    request: Request,
) -> Json<UploadResponse>
where
    B: BlobStore + 'static,
    S: RecordSink + 'static,
{
    info!(
        content_type = ?request.headers().get(CONTENT_TYPE),
        "Received upload request"
    );

    let result = match parse_upload(request).await {
        Ok(upload) => state.upload_service.handle(upload).await,
        Err(err) => {
            warn!(error = %err, "Rejected malformed upload");
            UploadResult::failure(&err)
        }
    };

    Json(UploadResponse::from(result))
}
