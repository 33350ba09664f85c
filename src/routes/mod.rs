//! HTTP route handlers.
//!
//! Only the probe surface lives here: liveness and readiness under the API base
//! path. Both responses carry `Cache-Control: no-store` so an intermediate cache
//! never answers a probe with a stale status.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod readyz;

use axum::{middleware, routing::get, Router};
use axum::http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_PROBE, HEALTH_PATH, READYZ_PATH};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with the probe routes.
pub fn create_router(state: AppState) -> Router {
    let probe_routes = Router::new()
        .route(READYZ_PATH, get(readyz::readyz))
        .route(HEALTH_PATH, get(health::health))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_PROBE),
        ));

    Router::new()
        .merge(probe_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
