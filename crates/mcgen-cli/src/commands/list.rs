use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use mcgen_pipeline::{expand, filter, parse_topology};

use crate::error::{CliError, CliResult};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Topology file (one element per line: cpu core domain name os-hint).
    #[arg(value_name = "TOPOLOGY")]
    pub topology: PathBuf,

    /// List every candidate, not just the selected set.
    #[arg(short, long)]
    pub all: bool,
}

pub fn execute(args: ListArgs, config_path: Option<&Path>) -> CliResult<()> {
    let config = super::load_config(config_path)?;
    config.validate()?;
    let soc = config.soc()?;

    if !args.topology.exists() {
        return Err(CliError::TopologyNotFound {
            path: args.topology.clone(),
        });
    }
    let topology_text = fs::read_to_string(&args.topology)?;

    let topology = parse_topology(&topology_text)?;
    let expansion = expand(&topology, soc);
    let selected: HashSet<String> = filter(
        &expansion,
        &config.multiconfig.enabled,
        config.multiconfig.full,
    )
    .into_iter()
    .map(|c| c.name)
    .collect();

    for candidate in &expansion.candidates {
        let name = if candidate.name.is_empty() {
            "(default)"
        } else {
            candidate.name.as_str()
        };
        let mark = if selected.contains(&candidate.name) {
            '*'
        } else if !args.all {
            continue;
        } else {
            ' '
        };
        println!("{mark} {name:<40} {}", candidate.element);
    }
    Ok(())
}
