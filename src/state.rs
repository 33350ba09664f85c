//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::readiness::Readiness;

/// Shared application state, cloneable across handlers.
///
/// Holds the configuration and a handle to the readiness flag the health routes report.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub readiness: Readiness,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, readiness: Readiness) -> Self {
        Self { config, readiness }
    }
}
