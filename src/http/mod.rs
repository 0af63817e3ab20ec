//! HTTP server module.
//!
//! Plain HTTP only; TLS is expected to terminate at the load balancer.
//!
//! The server includes:
//! - Early bind so a taken port aborts startup
//! - Graceful shutdown on SIGTERM/SIGINT with a bounded grace period

mod server;
mod shutdown;

pub use server::{bind, serve, ServerError, ShutdownOutcome};
pub use shutdown::{wait_for_signal, ShutdownSignal};
