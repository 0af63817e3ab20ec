//! Health check endpoint polled by the load balancer and the auto-healer.
//!
//! Every call is counted, whether or not the instance reports healthy. While
//! the health flag is off the endpoint answers 503, which is what makes the
//! orchestrator replace this instance.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::iso_timestamp;
use crate::state::AppState;
use crate::system;

pub const UNHEALTHY_MESSAGE: &str = "Service is unhealthy - auto-healing should trigger";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HealthResponse {
    Healthy {
        status: &'static str,
        timestamp: String,
        hostname: String,
        /// Seconds since start
        uptime: f64,
        checks: u64,
    },
    Unhealthy {
        status: &'static str,
        timestamp: String,
        hostname: String,
        message: &'static str,
    },
}

/// Health check handler.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let checks = state.health.record_check();

    if state.health.is_healthy() {
        (
            StatusCode::OK,
            Json(HealthResponse::Healthy {
                status: "healthy",
                timestamp: iso_timestamp(),
                hostname: system::hostname(),
                uptime: state.uptime().as_secs_f64(),
                checks,
            }),
        )
    } else {
        tracing::debug!(checks, "Health check answered unhealthy");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::Unhealthy {
                status: "unhealthy",
                timestamp: iso_timestamp(),
                hostname: system::hostname(),
                message: UNHEALTHY_MESSAGE,
            }),
        )
    }
}
