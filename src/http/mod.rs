//! REST server: the long-running service behind the bootstrap.
//!
//! The server:
//! - binds the validated port and only then reports ready
//! - serves the probe routes
//! - drains gracefully on SIGTERM/SIGINT, reporting not-ready first

mod server;
mod shutdown;

pub use server::RestServer;
pub use shutdown::{install_signal_handlers, Shutdown};
