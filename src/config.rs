//! Configuration loading and constants.
//!
//! Configuration comes from three layers: built-in defaults, an optional TOML
//! file, and the `PORT` environment variable. `AppConfig` is the root struct;
//! every section is optional in the file.

use serde::Deserialize;
use std::path::Path;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// API and admin responses must never be served from an intermediary cache
pub const CACHE_CONTROL_API: &str = "no-store";

/// Status page may be stored but must be revalidated
pub const CACHE_CONTROL_STATUS_PAGE: &str = "no-cache";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default bind address (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable overriding the listening port
pub const PORT_ENV_VAR: &str = "PORT";

/// Seconds in-flight requests get to finish after a termination signal
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Busy-wait duration when `/api/stress` gets no usable `duration`
pub const DEFAULT_STRESS_DURATION_MS: u64 = 5000;

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "autoheal_demo=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Generic 500 message used when error details are hidden
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    #[serde(default)]
    pub stress: StressConfig,
    /// Error response configuration
    #[serde(default)]
    pub errors: ErrorConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownConfig {
    /// Grace period for in-flight requests (default: 10 seconds)
    #[serde(default = "ShutdownConfig::default_grace_period")]
    pub grace_period_seconds: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_seconds: Self::default_grace_period(),
        }
    }
}

impl ShutdownConfig {
    fn default_grace_period() -> u64 {
        DEFAULT_SHUTDOWN_GRACE_SECS
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StressConfig {
    /// Fallback busy-wait duration in milliseconds (default: 5000)
    #[serde(default = "StressConfig::default_duration")]
    pub default_duration_ms: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: Self::default_duration(),
        }
    }
}

impl StressConfig {
    fn default_duration() -> u64 {
        DEFAULT_STRESS_DURATION_MS
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorConfig {
    /// Include the underlying error text in 500 responses (default: true)
    #[serde(default = "ErrorConfig::default_expose_details")]
    pub expose_details: bool,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            expose_details: Self::default_expose_details(),
        }
    }
}

impl ErrorConfig {
    fn default_expose_details() -> bool {
        true
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;

        if config.logging.format != "text" && !config.logging.is_json() {
            return Err(ConfigError::Validation(format!(
                "Unknown logging.format '{}', expected \"text\" or \"json\"",
                config.logging.format
            )));
        }

        Ok(config)
    }

    /// Load from `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply the `PORT` environment variable value, if it is a valid port.
    ///
    /// Returns `false` when a value was present but unusable; the configured
    /// port is kept in that case.
    pub fn apply_port_env(&mut self, value: Option<&str>) -> bool {
        let Some(raw) = value else {
            return true;
        };
        match parse_port(raw) {
            Some(port) => {
                self.http.port = port;
                true
            }
            None => false,
        }
    }
}

/// Parse a listening port, rejecting zero and anything outside `u16`.
pub fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.shutdown.grace_period_seconds, 10);
        assert_eq!(config.stress.default_duration_ms, 5000);
        assert!(config.errors.expose_details);
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9090\n\n[errors]\nexpose_details = false").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.host, "0.0.0.0");
        assert!(!config.errors.expose_details);
        assert_eq!(config.shutdown.grace_period_seconds, 10);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = AppConfig::load(path).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.http.host, defaults.http.host);
        assert_eq!(config.http.port, defaults.http.port);
        assert_eq!(
            config.shutdown.grace_period_seconds,
            defaults.shutdown.grace_period_seconds
        );
        assert_eq!(
            config.stress.default_duration_ms,
            defaults.stress.default_duration_ms
        );
        assert_eq!(config.errors.expose_details, defaults.errors.expose_details);
        assert_eq!(config.logging.format, defaults.logging.format);
    }

    #[test]
    fn test_load_rejects_unknown_log_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nformat = \"xml\"").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/autoheal-demo.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_port_env_valid() {
        let mut config = AppConfig::default();
        assert!(config.apply_port_env(Some("3000")));
        assert_eq!(config.http.port, 3000);
    }

    #[test]
    fn test_port_env_invalid_keeps_configured_port() {
        let mut config = AppConfig::default();
        for raw in ["abc", "", "70000", "0", "-1"] {
            assert!(!config.apply_port_env(Some(raw)), "accepted {raw:?}");
            assert_eq!(config.http.port, 8080);
        }
    }

    #[test]
    fn test_port_env_unset() {
        let mut config = AppConfig::default();
        config.http.port = 9000;
        assert!(config.apply_port_env(None));
        assert_eq!(config.http.port, 9000);
    }
}
