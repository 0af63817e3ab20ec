//! Not-found fallback for unmatched routes.

use axum::{
    http::{StatusCode, Uri},
    Json,
};
use serde::Serialize;

use super::iso_timestamp;

#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub error: &'static str,
    pub path: String,
    pub timestamp: String,
}

/// 404 with the requested path echoed back exactly (query string excluded).
pub async fn not_found(uri: Uri) -> (StatusCode, Json<NotFoundBody>) {
    tracing::debug!(path = %uri.path(), "No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Not Found",
            path: uri.path().to_string(),
            timestamp: iso_timestamp(),
        }),
    )
}
