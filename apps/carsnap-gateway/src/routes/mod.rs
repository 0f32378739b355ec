//! API routes

pub mod upload;

use std::path::PathBuf;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    Router,
};
use carsnap_domain::ports::{BlobStore, RecordSink};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::upload::{StatusResponse, UploadJsonRequest, UploadResponse},
    handlers::{self, health::health_handler},
    AppState,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upload::upload_handler,
        handlers::photos::store_photo_handler,
        handlers::health::liveness_handler,
        handlers::health::health_handler
    ),
    components(
        schemas(UploadJsonRequest, UploadResponse, StatusResponse)
    ),
    tags(
        (name = "upload", description = "Car photo upload endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "carsnap API",
        version = "0.1.0",
        description = "Car photo upload service: stores the photo and records it in the cars sheet"
    )
)]
pub struct ApiDoc;

/// Router settings that depend on the deployment
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Directory served at `/files` (folder blob store)
    pub files_dir: Option<PathBuf>,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
}

/// Permissive CORS: any origin may POST with a `Content-Type` header
///
/// The layer answers every `OPTIONS` request itself, before routing.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the main application router
pub fn create_router<B, S>(state: AppState<B, S>, options: RouterOptions) -> Router
where
    B: BlobStore + 'static,
    S: RecordSink + 'static,
{
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(upload::routes::<B, S>())
        .route("/health", get(health_handler));

    if let Some(dir) = options.files_dir {
        router = router.nest_service("/files", ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(options.max_body_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
