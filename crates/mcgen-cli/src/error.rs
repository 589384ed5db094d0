//! Command-level error handling with sysexits-style exit codes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] mcgen_config::ConfigError),

    #[error("Topology file not found: {path}")]
    TopologyNotFound { path: PathBuf },

    #[error("Topology error: {0}")]
    Pipeline(#[from] mcgen_pipeline::PipelineError),

    #[error("Failed to write artifacts: {0}")]
    Emit(#[from] mcgen_emit::EmitError),

    #[error("{count} descriptor(s) could not be written")]
    PartialWrite { count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 78,            // EX_CONFIG
            CliError::TopologyNotFound { .. } => 66, // EX_NOINPUT
            CliError::Pipeline(_) => 65,          // EX_DATAERR
            CliError::Emit(_) => 73,              // EX_CANTCREAT
            CliError::PartialWrite { .. } => 73,  // EX_CANTCREAT
            CliError::Io(_) => 74,                // EX_IOERR
        }
    }
}
