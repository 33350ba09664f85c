//! Configuration loading and constants.
//!
//! The listen port is a command-line parameter only. Everything else the binary
//! needs (listener host, shutdown grace period, log format) comes from an
//! optional TOML file; every field has a default, so running without a file is
//! the normal case. `AppConfig` is the root configuration struct.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use const_format::formatcp;
use serde::Deserialize;

// =============================================================================
// Service identity and routes
// =============================================================================

/// Name used in log lines and probe responses
pub const SERVICE_NAME: &str = "terrarium";

/// Prefix for every HTTP route the service exposes
pub const API_BASE_PATH: &str = "/terrarium";

/// Readiness probe: 200 once the service can take traffic, 503 before
pub const READYZ_PATH: &str = formatcp!("{}/readyz", API_BASE_PATH);

/// Liveness probe: 200 whenever the process answers HTTP
pub const HEALTH_PATH: &str = formatcp!("{}/health", API_BASE_PATH);

/// Probe responses must never be served from a cache
pub const CACHE_CONTROL_PROBE: &str = "no-store";

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Defaults
// =============================================================================

/// Default listen port when `-port` is not given
pub const DEFAULT_PORT: &str = "8888";

/// Default listener address
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Seconds to let in-flight requests finish after a shutdown signal
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

/// Default log filter when neither `--log-level` nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = formatcp!("{}=debug,tower_http=info", SERVICE_NAME);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration. The port is deliberately absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Address to bind (default: 0.0.0.0)
    #[serde(default = "HttpConfig::default_host")]
    pub host: IpAddr,
    /// Upper bound on connection draining after a shutdown signal (default: 30)
    #[serde(default = "HttpConfig::default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            shutdown_grace_seconds: Self::default_shutdown_grace(),
        }
    }
}

impl HttpConfig {
    fn default_host() -> IpAddr {
        DEFAULT_HOST
    }

    fn default_shutdown_grace() -> u64 {
        DEFAULT_SHUTDOWN_GRACE_SECS
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log format: "text" (default) or "json"
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(READYZ_PATH, "/terrarium/readyz");
        assert_eq!(HEALTH_PATH, "/terrarium/health");
        assert_eq!(DEFAULT_LOG_FILTER, "terrarium=debug,tower_http=info");
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_or_default(None::<&str>).unwrap();
        assert_eq!(config.http.host, DEFAULT_HOST);
        assert_eq!(config.http.shutdown_grace_seconds, 30);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.host, DEFAULT_HOST);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
[http]
host = "127.0.0.1"
shutdown_grace_seconds = 5

[logging]
format = "json"
"#,
        );
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.http.shutdown_grace_seconds, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_port_in_file_is_rejected() {
        let file = write_config("[http]\nport = 9000\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let file = write_config("[logging]\nformat = \"xml\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let file = write_config("[http]\nhost = \"not-an-ip\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
