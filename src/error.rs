//! Top-level startup errors.
//!
//! Every variant is fatal: `main` logs it and exits with a failure status
//! before the service is launched.

use crate::config::ConfigError;
use crate::port::PortError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
