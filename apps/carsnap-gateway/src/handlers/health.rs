//! Liveness and method fallback handlers
//!
//! `OPTIONS` never reaches a handler: the CORS layer answers every preflight.

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::dto::upload::{StatusResponse, UploadResponse};

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn liveness_handler() -> Json<StatusResponse> {
    Json(StatusResponse::running())
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Any method an upload route does not serve
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(UploadResponse::error("Method not allowed")),
    )
}
