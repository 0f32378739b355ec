//! Upload routes

use axum::{
    routing::{get, post},
    Router,
};
use carsnap_domain::ports::{BlobStore, RecordSink};

use crate::{
    handlers::{
        health::{liveness_handler, method_not_allowed},
        photos::store_photo_handler,
        upload::upload_handler,
    },
    AppState,
};

/// Create upload routes
pub fn routes<B, S>() -> Router<AppState<B, S>>
where
    B: BlobStore + 'static,
    S: RecordSink + 'static,
{
    Router::new()
        .route(
            "/",
            get(liveness_handler)
                .post(upload_handler::<B, S>)
                .fallback(method_not_allowed),
        )
        .route(
            "/photos",
            post(store_photo_handler::<B, S>).fallback(method_not_allowed),
        )
}
