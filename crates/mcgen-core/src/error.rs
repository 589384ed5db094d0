//! Error types shared across mcgen crates.

use thiserror::Error;

/// Errors raised while parsing core identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The compatible string does not name a supported CPU family.
    #[error("unknown cpu family: {0}")]
    UnknownCpuFamily(String),

    /// The SoC family token is not one of the supported platforms.
    #[error("unknown soc family: {0}")]
    UnknownSocFamily(String),

    /// The os-hint token is not in the supported enumeration.
    #[error("unknown os hint: {0}")]
    UnknownOsHint(String),
}
