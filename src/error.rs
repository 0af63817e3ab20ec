//! Request-time errors and their JSON rendering.
//!
//! Handlers return `Result<_, AppErrorResponse>`; the error side renders as a
//! 500 JSON body and is logged together with the request id. Panics caught by
//! the router's panic layer render through the same body builder.

use std::any::Any;

use axum::{
    http::{
        header::{HeaderValue, CACHE_CONTROL},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::CACHE_CONTROL_API;
use crate::middleware::RequestId;
use crate::routes::iso_timestamp;

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// 500 body: `{error, message, timestamp}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub timestamp: String,
}

/// Marker placed in response extensions for every 500 produced here, so the
/// error-detail middleware can redact the message when configured to.
#[derive(Debug, Clone, Copy)]
pub struct InternalErrorMarker;

/// Build the 500 JSON response for an error message. Error responses are
/// never cacheable, whichever route produced them.
pub fn internal_error_response(message: String) -> Response {
    let body = ErrorBody {
        error: INTERNAL_SERVER_ERROR,
        message,
        timestamp: iso_timestamp(),
    };
    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_API));
    response.extensions_mut().insert(InternalErrorMarker);
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        internal_error_response(self.to_string())
    }
}

/// An `AppError` tagged with the request it happened in.
#[derive(Debug)]
pub struct AppErrorResponse {
    pub error: AppError,
    pub request_id: Option<RequestId>,
}

impl From<AppError> for AppErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error,
            request_id: None,
        }
    }
}

impl IntoResponse for AppErrorResponse {
    fn into_response(self) -> Response {
        match &self.request_id {
            Some(RequestId(id)) => {
                tracing::error!(request_id = %id, error = %self.error, "Request failed")
            }
            None => tracing::error!(error = %self.error, "Request failed"),
        }
        internal_error_response(self.error.to_string())
    }
}

/// Attach a request id to the error side of a result.
pub trait ResultExt<T> {
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse> {
        self.map_err(|e| AppErrorResponse {
            error: e.into(),
            request_id: Some(request_id.clone()),
        })
    }
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer`.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!(error = %message, "Handler panicked");
    internal_error_response(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error_response_is_marked() {
        let response = internal_error_response("boom".to_string());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<InternalErrorMarker>().is_some());
    }

    #[test]
    fn test_internal_error_response_is_not_cacheable() {
        let response = internal_error_response("boom".to_string());
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_panic_payload_string() {
        let response = handle_panic(Box::new("kaboom".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_with_request_id_keeps_id() {
        let id = RequestId(uuid::Uuid::new_v4());
        let result: Result<(), AppError> = Err(AppError::Internal("x".into()));
        let err = result.with_request_id(&id).unwrap_err();
        assert_eq!(err.request_id.map(|r| r.0), Some(id.0));
        assert_eq!(err.error.to_string(), "Internal error: x");
    }
}
