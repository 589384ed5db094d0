//! Pipeline errors.
//!
//! Malformed topology input is fatal and unwinds to the CLI; recoverable
//! conditions (unknown CPU family, unmatched enabled name, missing backing
//! artifact) are logged at the point of occurrence and never surface here.

use thiserror::Error;

use mcgen_config::ConfigError;

/// Errors that abort the resolution pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A topology row did not parse.
    #[error("malformed topology row at line {line_no}: {reason}")]
    MalformedRow { line_no: usize, reason: String },

    /// Two topology rows share an element name; resolving both would
    /// silently overwrite one.
    #[error("duplicate element name `{name}` at line {line_no}")]
    DuplicateElement { name: String, line_no: usize },

    /// The project configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
