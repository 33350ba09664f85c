//! Graceful shutdown and signal handling.
//!
//! A [`Shutdown`] is a one-way latch: once triggered it stays triggered, and
//! every waiter (current or future) observes it. SIGTERM and SIGINT trigger it
//! through [`install_signal_handlers`]; tests trigger it directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

/// Shutdown latch shared by the server and whatever stops it.
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger shutdown. Later calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once shutdown has been triggered.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Resolve `grace` after shutdown is triggered.
    pub async fn deadline(&self, grace: Duration) {
        self.triggered().await;
        tokio::time::sleep(grace).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Trigger `shutdown` on SIGTERM or SIGINT. A second signal while draining
/// exits the process immediately with status 1.
///
/// Spawns background tasks; must be called from within a tokio runtime.
pub fn install_signal_handlers(shutdown: Shutdown) {
    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(forward_os_signals(tx));
    tokio::spawn(handle_signals(rx, shutdown, || {
        std::process::exit(1);
    }));
}

/// Forward every SIGINT/SIGTERM received to `tx` by name.
async fn forward_os_signals(tx: mpsc::Sender<&'static str>) {
    #[cfg(unix)]
    let mut sigterm =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => Some(sigterm),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                None
            }
        };
    let mut ctrl_c_available = true;

    loop {
        let available = ctrl_c_available;
        let ctrl_c = async move {
            if !available {
                return std::future::pending().await;
            }
            tokio::signal::ctrl_c().await
        };

        #[cfg(unix)]
        let terminate = async {
            match sigterm.as_mut() {
                Some(sigterm) => sigterm.recv().await,
                None => std::future::pending().await,
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        let name = tokio::select! {
            result = ctrl_c => match result {
                Ok(()) => "SIGINT",
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                    ctrl_c_available = false;
                    continue;
                }
            },
            received = terminate => match received {
                Some(()) => "SIGTERM",
                None => return,
            },
        };

        if tx.send(name).await.is_err() {
            return;
        }
    }
}

/// First signal triggers `shutdown`; the second calls `force`.
pub(crate) async fn handle_signals(
    mut rx: mpsc::Receiver<&'static str>,
    shutdown: Shutdown,
    force: impl FnOnce(),
) {
    let Some(signal) = rx.recv().await else {
        return;
    };
    tracing::info!(signal, "Received {}, initiating graceful shutdown", signal);
    shutdown.trigger();

    if let Some(signal) = rx.recv().await {
        tracing::warn!(signal, "Received {} while draining, exiting immediately", signal);
        force();
    }
}
