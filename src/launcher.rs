//! Service launch and lifecycle join.
//!
//! The service is opaque to the bootstrap: it is reached through a single
//! [`ServiceEntry::run`] call on its own tokio task. The bootstrap keeps a
//! [`ServiceHandle`] and waits on it once; the wait resolves when the service
//! returns, fails, or panics. Restarting a dead service is left to whatever
//! supervises the process.

use std::any::Any;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::port::Port;

/// Error a service reports when it stops for a reason other than a clean shutdown.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Entry point of the long-running service.
///
/// Implementations receive the validated port unchanged, flip the readiness
/// flag once they can serve traffic, and must eventually return so the
/// bootstrap's wait can resolve.
#[async_trait]
pub trait ServiceEntry: Send + Sync + 'static {
    async fn run(&self, port: Port) -> Result<(), ServiceError>;
}

/// How the service unit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceExit {
    /// The service returned `Ok`, e.g. after a graceful shutdown.
    Completed,
    /// The service returned an error.
    Failed(String),
    /// The service task panicked.
    Panicked(String),
}

impl ServiceExit {
    pub fn is_success(&self) -> bool {
        matches!(self, ServiceExit::Completed)
    }
}

/// One-shot join handle for a launched service.
///
/// [`wait`](Self::wait) consumes the handle, so the completion signal has
/// exactly one consumer.
#[derive(Debug)]
pub struct ServiceHandle {
    port: Port,
    task: JoinHandle<Result<(), ServiceError>>,
}

impl ServiceHandle {
    /// Port the service was launched with.
    pub fn port(&self) -> Port {
        self.port
    }

    /// Whether the service task has already ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Suspend until the service task ends.
    ///
    /// There is no timeout: the wait lasts as long as the service runs.
    pub async fn wait(self) -> ServiceExit {
        let exit = match self.task.await {
            Ok(Ok(())) => ServiceExit::Completed,
            Ok(Err(e)) => ServiceExit::Failed(e.to_string()),
            Err(e) if e.is_panic() => ServiceExit::Panicked(panic_message(e.into_panic())),
            Err(e) => ServiceExit::Failed(e.to_string()),
        };

        match &exit {
            ServiceExit::Completed => {
                tracing::info!(port = %self.port, "Service stopped");
            }
            ServiceExit::Failed(reason) => {
                tracing::error!(port = %self.port, error = %reason, "Service terminated with error");
            }
            ServiceExit::Panicked(reason) => {
                tracing::error!(port = %self.port, panic = %reason, "Service panicked");
            }
        }

        exit
    }
}

/// Start `service` on its own task with the validated `port`.
///
/// Must be called from within a tokio runtime.
pub fn launch<S: ServiceEntry>(service: S, port: Port) -> ServiceHandle {
    tracing::debug!(%port, "Launching service");
    let task = tokio::spawn(async move { service.run(port).await });
    ServiceHandle { port, task }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
