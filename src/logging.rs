//! Tracing subscriber setup.
//!
//! Filter priority: `--log-level` > RUST_LOG > [`DEFAULT_LOG_FILTER`].
//! Format priority: `--log-format` > config file > text.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, DEFAULT_LOG_FILTER};
use crate::error::Error;

/// Pick the filter directive string from the CLI value and the environment.
pub fn resolve_filter(cli: Option<String>, env: Option<String>) -> String {
    cli.or(env)
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Install the global subscriber. Fails if the filter does not parse or a
/// subscriber is already installed.
pub fn init(filter: &str, format: LogFormat) -> Result<(), Error> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| Error::Logging(format!("invalid log filter '{}': {}", filter, e)))?;

    let (text, json) = match format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Like [`init`], but if the requested setup fails the default filter is
/// installed instead so later startup errors still reach the log. The original
/// failure is returned.
pub fn init_with_fallback(filter: &str, format: LogFormat) -> Result<(), Error> {
    init(filter, format).inspect_err(|_| {
        let _ = init(DEFAULT_LOG_FILTER, format);
    })
}
