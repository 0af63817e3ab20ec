//! HTTP server startup and shutdown sequencing.
//!
//! The listener is bound before serving starts, so a taken port fails startup
//! immediately. Once the shutdown future resolves the server stops accepting
//! connections and in-flight requests get the grace period to finish.

use std::future::Future;
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use axum::Router;
use axum_server::Handle;

use crate::config::AppConfig;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address '{0}': {1}")]
    Address(String, std::net::AddrParseError),

    #[error("Failed to bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// How the server stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// All connections finished within the grace period
    Clean,
    /// The grace period elapsed with requests still in flight
    Forced,
}

impl ShutdownOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            ShutdownOutcome::Clean => 0,
            ShutdownOutcome::Forced => 1,
        }
    }
}

/// Bind the configured address on all requested interfaces.
pub fn bind(config: &AppConfig) -> Result<TcpListener, ServerError> {
    let raw = format!("{}:{}", config.http.host, config.http.port);
    let addr: SocketAddr = raw
        .parse()
        .map_err(|e| ServerError::Address(raw.clone(), e))?;

    let listener = TcpListener::bind(addr).map_err(|e| ServerError::Bind(addr, e))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| ServerError::Bind(addr, e))?;
    Ok(listener)
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain.
///
/// Returns `Forced` when connections are still open after `grace`.
pub async fn serve<F>(
    app: Router,
    listener: TcpListener,
    shutdown: F,
    grace: Duration,
) -> Result<ShutdownOutcome, ServerError>
where
    F: Future<Output = ()>,
{
    let handle = Handle::new();
    let server = axum_server::from_tcp(listener)
        .handle(handle.clone())
        .serve(app.into_make_service_with_connect_info::<SocketAddr>());
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result?;
            return Ok(ShutdownOutcome::Clean);
        }
        () = shutdown => {}
    }

    handle.graceful_shutdown(None);
    tracing::info!(
        grace_secs = grace.as_secs_f64(),
        connections = handle.connection_count(),
        "Stopped accepting connections, waiting for in-flight requests"
    );

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            result?;
            tracing::info!("Server closed");
            Ok(ShutdownOutcome::Clean)
        }
        Err(_) => {
            tracing::error!(
                connections = handle.connection_count(),
                "Grace period elapsed, forcing shutdown"
            );
            Ok(ShutdownOutcome::Forced)
        }
    }
}
