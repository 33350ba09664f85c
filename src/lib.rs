//! terrarium: readiness-gated bootstrap for a long-running REST service.
//!
//! The binary validates its `-port` parameter, creates the readiness flag in
//! the not-ready state, launches the REST server as a single task and keeps the
//! process alive until that task ends.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod launcher;
pub mod logging;
pub mod middleware;
pub mod port;
pub mod readiness;
pub mod routes;
pub mod state;

pub use bootstrap::{Bootstrap, Phase};
pub use error::Error;
pub use launcher::{launch, ServiceEntry, ServiceError, ServiceExit, ServiceHandle};
pub use port::{validate, Port, PortError};
pub use readiness::Readiness;
