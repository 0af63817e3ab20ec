//! HTTP route handlers.
//!
//! Routes are grouped by audience: the status page for humans, `/api/*` for
//! probes and tooling, `/admin/*` for fault injection. API and admin responses
//! are marked `no-store` so a health probe never sees a cached answer.
//!
//! Every request passes through the request-logging middleware first; panics
//! in handlers are caught and rendered as 500 JSON responses.

pub mod admin;
pub mod fallback;
pub mod health;
pub mod home;
pub mod info;
pub mod stress;

use axum::{
    http::header::{HeaderValue, CACHE_CONTROL},
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use tower_http::{catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer};

use crate::config::{CACHE_CONTROL_API, CACHE_CONTROL_STATUS_PAGE};
use crate::error::handle_panic;
use crate::middleware::{error_detail_layer, request_log_layer};
use crate::state::AppState;

/// Current UTC time as ISO-8601 with millisecond precision, e.g.
/// `2024-05-01T12:00:00.123Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Creates the Axum router with all routes, fallbacks and middleware.
pub fn create_router(state: AppState) -> Router {
    // Status page - revalidate on every view
    let page_routes = Router::new().route("/", get(home::index)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_STATUS_PAGE),
        ),
    );

    // Probe and tooling endpoints - never cached
    let api_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/info", get(info::info))
        .route("/api/stress", get(stress::stress))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_API),
        ));

    // Fault injection - never cached
    let admin_routes = Router::new()
        .route("/admin/break-health", post(admin::break_health))
        .route("/admin/restore-health", post(admin::restore_health))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_API),
        ));

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .merge(admin_routes)
        // A known path with the wrong method is treated as unknown
        .method_not_allowed_fallback(fallback::not_found)
        .fallback(fallback::not_found)
        .with_state(state.clone())
        // Panics become 500 JSON responses
        .layer(CatchPanicLayer::custom(handle_panic))
        // Redacts 500 messages when errors.expose_details is off
        .layer(middleware::from_fn_with_state(state, error_detail_layer))
        // Request logging - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_log_layer))
}
