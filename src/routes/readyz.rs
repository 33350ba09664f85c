//! Readiness probe.
//!
//! Reports whether the service can take real traffic. Load balancers and
//! orchestrators should only route requests here after a 200.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::config::SERVICE_NAME;
use crate::state::AppState;

/// Body returned by the readiness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyzResponse {
    pub success: bool,
    pub message: String,
}

/// Readiness handler: 200 when ready, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyzResponse>) {
    if state.readiness.is_ready() {
        (
            StatusCode::OK,
            Json(ReadyzResponse {
                success: true,
                message: format!("{} is ready", SERVICE_NAME),
            }),
        )
    } else {
        tracing::debug!("Readiness probe while not ready");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyzResponse {
                success: false,
                message: format!("{} is NOT ready", SERVICE_NAME),
            }),
        )
    }
}
