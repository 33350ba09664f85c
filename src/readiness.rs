//! Readiness state shared between the bootstrap, the service and health probes.
//!
//! Readiness is distinct from liveness: the process can be alive (answering
//! `/health`) long before it is ready to take real traffic. The flag starts out
//! `false` and is flipped by the service once it can serve requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to the readiness flag.
///
/// All clones observe the same flag. Create one in `main` before any concurrent
/// work starts and pass clones to whichever component reads or writes it.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    ready: Arc<AtomicBool>,
}

impl Readiness {
    /// Create a new flag in the not-ready state.
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the flag. Setting the value it already holds is a no-op.
    pub fn set_ready(&self, value: bool) {
        let previous = self.ready.swap(value, Ordering::AcqRel);
        if previous != value {
            tracing::debug!(ready = value, "Readiness changed");
        }
    }

    /// Current value of the flag.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
