//! CLI commands.

pub mod generate;
pub mod list;

use std::path::Path;

pub use generate::GenerateArgs;
pub use list::ListArgs;

use crate::error::CliResult;
use mcgen_config::McgenConfig;

/// Load the configuration from an explicit path or by ancestor discovery.
/// Validation happens in the commands, after flag overrides are applied.
pub(crate) fn load_config(explicit: Option<&Path>) -> CliResult<McgenConfig> {
    let config = match explicit {
        Some(path) => McgenConfig::from_file(path)?,
        None => McgenConfig::discover()?,
    };
    Ok(config)
}
