//! autoheal-demo: a demo server for auto-healing instance groups.
//!
//! This is the application entry point. It loads configuration (optional TOML
//! file, then the PORT environment variable, then CLI flags), initializes
//! tracing, builds the router and serves until SIGTERM/SIGINT.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoheal_demo::config::{AppConfig, DEFAULT_LOG_FILTER, PORT_ENV_VAR};
use autoheal_demo::http::{self, ShutdownOutcome};
use autoheal_demo::templates::init_templates;
use autoheal_demo::{create_router, system, AppState};

/// autoheal-demo: health, info and fault-injection endpoints for auto-healing demos
#[derive(Parser, Debug)]
#[command(name = "autoheal-demo", version, about)]
struct Args {
    /// Path to an optional configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level filter (e.g., "autoheal_demo=debug")
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_tracing(filter: &str, json: bool) {
    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(filter));

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(args: Args) -> Result<ShutdownOutcome, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load_or_default(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, config.logging.is_json());

    let port_env = std::env::var(PORT_ENV_VAR).ok();
    if !config.apply_port_env(port_env.as_deref()) {
        tracing::warn!(
            value = ?port_env,
            port = config.http.port,
            "Ignoring invalid PORT environment variable"
        );
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    let tera = init_templates()?;
    let grace = Duration::from_secs(config.shutdown.grace_period_seconds);
    let listener = http::bind(&config)?;
    let port = config.http.port;

    let state = AppState::new(config, tera);
    let app = create_router(state.clone());

    tracing::info!(
        port,
        hostname = %system::hostname(),
        version = env!("CARGO_PKG_VERSION"),
        healthy = state.health.is_healthy(),
        "autoheal-demo started"
    );
    tracing::info!("Health endpoint: http://localhost:{}/api/health", port);

    let outcome = http::serve(
        app,
        listener,
        async {
            http::wait_for_signal().await;
        },
        grace,
    )
    .await?;

    Ok(outcome)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(ShutdownOutcome::Clean) => ExitCode::SUCCESS,
        Ok(ShutdownOutcome::Forced) => {
            // Busy stress loops on the blocking pool would keep the runtime
            // from shutting down, so leave without dropping it.
            std::process::exit(i32::from(ShutdownOutcome::Forced.exit_code()));
        }
        Err(e) => {
            if tracing::dispatcher::has_been_set() {
                tracing::error!(error = %e, "Startup failed");
            } else {
                eprintln!("autoheal-demo: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
