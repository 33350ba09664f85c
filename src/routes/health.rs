//! Liveness probe.
//!
//! Answers 200 whenever the process can respond to HTTP at all, independent of
//! readiness. Orchestrators use it to decide whether to restart the process.

/// Liveness handler.
pub async fn health() -> &'static str {
    "ok"
}
