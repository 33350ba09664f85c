//! Listen port validation.
//!
//! The port arrives as text from the command line and is checked before any
//! resource is allocated. A value outside `1..=65535` or one that does not parse
//! as an integer is a fatal configuration error; deciding to exit is left to the
//! caller.

use std::fmt;
use std::str::FromStr;

/// Lowest port a listener may bind.
pub const MIN_PORT: i64 = 1;

/// Highest port a listener may bind.
pub const MAX_PORT: i64 = 65535;

/// A TCP port that passed validation.
///
/// The only way to build one is through [`validate`] (or `str::parse`), so holding
/// a `Port` means the value is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(u16);

impl Port {
    /// The numeric port value.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Rejected port input. Carries the raw text so the diagnostic can name it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("{0} is not a valid port number. Please retry with a valid port number (ex: -port=[1-65535]).")]
    NotANumber(String),

    #[error("{0} is not a valid port number. Please retry with a valid port number (ex: -port=[1-65535]).")]
    OutOfRange(String),
}

impl PortError {
    /// The input that failed validation.
    pub fn input(&self) -> &str {
        match self {
            PortError::NotANumber(raw) | PortError::OutOfRange(raw) => raw,
        }
    }
}

/// Parse and range-check a port given as text.
pub fn validate(raw: &str) -> Result<Port, PortError> {
    let value: i64 = raw
        .parse()
        .map_err(|_| PortError::NotANumber(raw.to_string()))?;

    if !(MIN_PORT..=MAX_PORT).contains(&value) {
        return Err(PortError::OutOfRange(raw.to_string()));
    }

    // In range, so the narrowing cannot fail.
    u16::try_from(value)
        .map(Port)
        .map_err(|_| PortError::OutOfRange(raw.to_string()))
}
