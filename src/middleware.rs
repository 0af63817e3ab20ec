//! Request logging and error-detail middleware.
//!
//! `request_log_layer` generates a UUID v4 for each incoming request, logs the
//! request line (timestamp, method, path, client address) before dispatch, and
//! wraps the request in a tracing span so every log emitted while handling it
//! carries the request id.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::GENERIC_ERROR_MESSAGE;
use crate::error::{internal_error_response, InternalErrorMarker};
use crate::routes::iso_timestamp;
use crate::state::AppState;

/// Extension type for accessing request ID in handlers.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

/// Client address as shown in logs; "-" when the connection info is missing
/// (e.g. requests driven directly through the router in tests).
fn client_addr(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Middleware that logs each request and creates a request span.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including other middleware and handlers.
pub async fn request_log_layer(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_addr(&request);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    request.extensions_mut().insert(RequestId(request_id));

    async move {
        tracing::info!(
            timestamp = %iso_timestamp(),
            client = %client,
            "{} {} - {}",
            method,
            path,
            client
        );

        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::debug!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await
}

/// Replace the message of 500 responses with a generic one when
/// `errors.expose_details` is off.
pub async fn error_detail_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if state.config.errors.expose_details
        || response.extensions().get::<InternalErrorMarker>().is_none()
    {
        return response;
    }

    internal_error_response(GENERIC_ERROR_MESSAGE.to_string())
}
