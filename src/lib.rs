//! autoheal-demo - a demo HTTP server for auto-healing instance groups.
//!
//! Serves a status page, a health endpoint whose answer can be switched off
//! through admin endpoints, an environment info endpoint and a CPU stress
//! endpoint. Load balancers and instance-group auto-healers probe
//! `/api/health` and replace the instance once it answers 503.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod system;
pub mod templates;

pub use error::{AppError, AppErrorResponse};
pub use routes::create_router;
pub use state::AppState;
