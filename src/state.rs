//! Shared application state for request handlers.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tera::Tera;

use crate::config::AppConfig;

/// Health flag and probe counter, mutated by handlers.
///
/// Both fields are atomics so concurrent probes never lose an increment and
/// admin toggles are visible to the next request on any worker thread.
#[derive(Debug)]
pub struct HealthState {
    healthy: AtomicBool,
    check_count: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            check_count: AtomicU64::new(0),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Set the health flag, returning the previous value.
    pub fn set_healthy(&self, healthy: bool) -> bool {
        self.healthy.swap(healthy, Ordering::SeqCst)
    }

    /// Count one health probe and return the new total.
    pub fn record_check(&self) -> u64 {
        self.check_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn check_count(&self) -> u64 {
        self.check_count.load(Ordering::SeqCst)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the configuration, the status page templates, the health state
/// and the process start time used for uptime.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub health: Arc<HealthState>,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates a new application state; the start time is captured here.
    pub fn new(config: AppConfig, tera: Tera) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            health: Arc::new(HealthState::new()),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
