//! Fault injection: flip the health flag off and back on.
//!
//! Both handlers set the flag unconditionally, so repeating a call leaves the
//! state unchanged.

use axum::{extract::State, Json};
use serde::Serialize;

use super::iso_timestamp;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BreakHealthResponse {
    pub message: &'static str,
    pub note: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct RestoreHealthResponse {
    pub message: &'static str,
    pub timestamp: String,
}

pub async fn break_health(State(state): State<AppState>) -> Json<BreakHealthResponse> {
    let was_healthy = state.health.set_healthy(false);
    tracing::warn!(
        was_healthy,
        "Health status set to UNHEALTHY - auto-healing will trigger"
    );

    Json(BreakHealthResponse {
        message: "Health status set to unhealthy",
        note: "Health checks will fail and auto-healing should recreate this instance",
        timestamp: iso_timestamp(),
    })
}

pub async fn restore_health(State(state): State<AppState>) -> Json<RestoreHealthResponse> {
    let was_healthy = state.health.set_healthy(true);
    tracing::info!(was_healthy, "Health status restored to HEALTHY");

    Json(RestoreHealthResponse {
        message: "Health status restored",
        timestamp: iso_timestamp(),
    })
}
