//! CPU stress endpoint.
//!
//! Busy-waits for the requested number of milliseconds before answering. The
//! loop runs on tokio's blocking pool, so it pins one OS thread at 100% for
//! the duration while every other endpoint keeps answering. No upper bound is
//! enforced on the duration.

use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::instrument;

use super::iso_timestamp;
use crate::error::{AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::system;

/// First `duration` value in the query. Pairs are kept as a list so a
/// repeated key never rejects the request.
pub fn first_duration(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "duration")
        .map(|(_, value)| value.as_str())
}

#[derive(Debug, Serialize)]
pub struct StressResponse {
    pub message: &'static str,
    /// Requested busy-wait in milliseconds
    pub duration: u64,
    pub hostname: String,
    pub timestamp: String,
}

/// Parse the `duration` query value the lenient way: leading whitespace is
/// skipped and the leading run of digits is used (`"250ms"` is 250). Missing,
/// non-numeric, zero or negative values yield `default_ms`.
pub fn parse_duration_ms(raw: Option<&str>, default_ms: u64) -> u64 {
    let Some(raw) = raw else {
        return default_ms;
    };
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(None, |acc: Option<u64>, b| {
            Some(
                acc.unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(u64::from(b - b'0')),
            )
        });

    match value {
        Some(ms) if ms > 0 => ms,
        _ => default_ms,
    }
}

/// Spin on floating-point work until `duration` of wall-clock time has
/// passed. Returns the number of iterations performed.
pub fn burn_cpu(duration: Duration) -> u64 {
    let start = Instant::now();
    let mut iterations: u64 = 0;
    let mut sink = 0.0f64;

    while start.elapsed() < duration {
        sink += rand::random::<f64>().sqrt();
        iterations += 1;
    }

    std::hint::black_box(sink);
    iterations
}

#[instrument(name = "stress::stress", skip(state, request_id, params))]
pub async fn stress(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<StressResponse>, AppErrorResponse> {
    let duration_ms = parse_duration_ms(
        first_duration(&params),
        state.config.stress.default_duration_ms,
    );
    tracing::info!(duration_ms, "Starting CPU stress");

    let iterations =
        tokio::task::spawn_blocking(move || burn_cpu(Duration::from_millis(duration_ms)))
            .await
            .with_request_id(&request_id)?;
    tracing::info!(duration_ms, iterations, "CPU stress completed");

    Ok(Json(StressResponse {
        message: "Stress test completed",
        duration: duration_ms,
        hostname: system::hostname(),
        timestamp: iso_timestamp(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_plain() {
        assert_eq!(parse_duration_ms(Some("200"), 5000), 200);
    }

    #[test]
    fn test_parse_duration_defaults() {
        assert_eq!(parse_duration_ms(None, 5000), 5000);
        assert_eq!(parse_duration_ms(Some(""), 5000), 5000);
        assert_eq!(parse_duration_ms(Some("abc"), 5000), 5000);
        assert_eq!(parse_duration_ms(Some("0"), 5000), 5000);
        assert_eq!(parse_duration_ms(Some("-10"), 5000), 5000);
    }

    #[test]
    fn test_parse_duration_leading_digits() {
        assert_eq!(parse_duration_ms(Some("250ms"), 5000), 250);
        assert_eq!(parse_duration_ms(Some("  42"), 5000), 42);
        assert_eq!(parse_duration_ms(Some("+7"), 5000), 7);
        assert_eq!(parse_duration_ms(Some("12.9"), 5000), 12);
    }

    #[test]
    fn test_parse_duration_saturates() {
        assert_eq!(
            parse_duration_ms(Some("99999999999999999999999"), 5000),
            u64::MAX
        );
    }

    #[test]
    fn test_first_duration_takes_first_of_repeated_keys() {
        let params = vec![
            ("x".to_string(), "1".to_string()),
            ("duration".to_string(), "50".to_string()),
            ("duration".to_string(), "60".to_string()),
        ];
        assert_eq!(first_duration(&params), Some("50"));
        assert_eq!(first_duration(&params[..1]), None);
    }

    #[test]
    fn test_burn_cpu_waits_at_least_duration() {
        let start = Instant::now();
        let iterations = burn_cpu(Duration::from_millis(50));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(iterations > 0);
    }

    #[test]
    fn test_burn_cpu_zero_returns_immediately() {
        assert_eq!(burn_cpu(Duration::ZERO), 0);
    }
}
