//! REST server startup logic.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::launcher::{ServiceEntry, ServiceError};
use crate::port::Port;
use crate::readiness::Readiness;
use crate::routes::create_router;
use crate::state::AppState;

use super::shutdown::{install_signal_handlers, Shutdown};

/// The REST API server, launched by the bootstrap as its one service.
///
/// Readiness goes `true` once the listener is bound and back to `false` as soon
/// as a shutdown is triggered, before connections are drained.
pub struct RestServer {
    config: Arc<AppConfig>,
    readiness: Readiness,
    shutdown: Shutdown,
    handle_signals: bool,
}

impl RestServer {
    pub fn new(config: Arc<AppConfig>, readiness: Readiness, shutdown: Shutdown) -> Self {
        Self {
            config,
            readiness,
            shutdown,
            handle_signals: true,
        }
    }

    /// Leave SIGTERM/SIGINT alone; only [`Shutdown::trigger`] stops the server.
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    fn grace_period(&self) -> Duration {
        Duration::from_secs(self.config.http.shutdown_grace_seconds)
    }
}

#[async_trait]
impl ServiceEntry for RestServer {
    /// Serve until shutdown is triggered or the listener fails.
    async fn run(&self, port: Port) -> Result<(), ServiceError> {
        let addr = SocketAddr::new(self.config.http.host, port.get());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;
        tracing::info!(address = %local_addr, "REST server listening");

        if self.handle_signals {
            install_signal_handlers(self.shutdown.clone());
        }

        let app = create_router(AppState::new(self.config.clone(), self.readiness.clone()));
        self.readiness.set_ready(true);

        let readiness = self.readiness.clone();
        let shutdown = self.shutdown.clone();
        let graceful = async move {
            shutdown.triggered().await;
            readiness.set_ready(false);
        };

        let grace = self.grace_period();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .into_future();

        tokio::select! {
            result = serve => {
                result?;
                tracing::info!("REST server stopped");
            }
            _ = self.shutdown.deadline(grace) => {
                tracing::warn!(
                    grace_seconds = grace.as_secs(),
                    "Grace period elapsed with connections still open, stopping anyway"
                );
            }
        }

        // Nothing can be served past this point.
        self.readiness.set_ready(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::launch;
    use crate::port::validate;

    #[tokio::test]
    async fn test_bind_failure_keeps_not_ready() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = validate(&occupied.local_addr().unwrap().port().to_string()).unwrap();

        let mut config = AppConfig::default();
        config.http.host = "127.0.0.1".parse().unwrap();
        let readiness = Readiness::new();
        let server = RestServer::new(Arc::new(config), readiness.clone(), Shutdown::new())
            .without_signal_handlers();

        let result = server.run(port).await;
        assert!(matches!(result, Err(ServiceError::Bind { .. })));
        assert!(!readiness.is_ready());
    }

    #[tokio::test]
    async fn test_trigger_stops_server_and_clears_readiness() {
        let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = validate(&free.local_addr().unwrap().port().to_string()).unwrap();
        drop(free);

        let mut config = AppConfig::default();
        config.http.host = "127.0.0.1".parse().unwrap();
        config.http.shutdown_grace_seconds = 1;
        let readiness = Readiness::new();
        let shutdown = Shutdown::new();
        let server = RestServer::new(Arc::new(config), readiness.clone(), shutdown.clone())
            .without_signal_handlers();

        let handle = launch(server, port);
        for _ in 0..100 {
            if readiness.is_ready() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(readiness.is_ready());

        shutdown.trigger();
        let exit = tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("server should stop after trigger");
        assert!(exit.is_success());
        assert!(!readiness.is_ready());
    }
}
