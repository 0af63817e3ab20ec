//! Instance information endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use super::iso_timestamp;
use crate::error::AppError;
use crate::state::AppState;
use crate::system::{self, CpuSnapshot, HostSnapshot, MemorySnapshot};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub hostname: String,
    pub platform: &'static str,
    pub arch: &'static str,
    pub runtime: &'static str,
    pub version: &'static str,
    /// Seconds since start
    pub uptime: f64,
    pub started_at: String,
    pub health_status: bool,
    pub health_check_count: u64,
    pub memory: MemorySnapshot,
    pub cpu: Vec<CpuSnapshot>,
    pub load_average: [f64; 3],
    pub timestamp: String,
}

/// Snapshot of the host and the server's health state. Read-only.
pub async fn info(State(state): State<AppState>) -> Result<Json<InfoResponse>, AppError> {
    // sysinfo reads /proc synchronously
    let host = tokio::task::spawn_blocking(HostSnapshot::read).await?;

    Ok(Json(InfoResponse {
        hostname: host.hostname,
        platform: system::platform(),
        arch: system::arch(),
        runtime: "rust",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.uptime().as_secs_f64(),
        started_at: state
            .started_at()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        health_status: state.health.is_healthy(),
        health_check_count: state.health.check_count(),
        memory: host.memory,
        cpu: host.cpus,
        load_average: host.load_average,
        timestamp: iso_timestamp(),
    }))
}
