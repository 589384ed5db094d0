use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use mcgen_emit::Synthesizer;
use mcgen_pipeline::run_pipeline;

use crate::error::{CliError, CliResult};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Topology file (one element per line: cpu core domain name os-hint).
    #[arg(value_name = "TOPOLOGY")]
    pub topology: PathBuf,

    /// Root directory the configuration tree hangs off.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Override the machine name from the configuration.
    #[arg(short, long, value_name = "NAME")]
    pub machine: Option<String>,

    /// Generate the full candidate set instead of the configured selection.
    #[arg(long)]
    pub full: bool,

    /// Resolve and print what would be written without touching the disk.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: GenerateArgs, config_path: Option<&Path>) -> CliResult<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(machine) = args.machine.as_deref() {
        config.machine = machine.to_string();
    }
    if args.full {
        config.multiconfig.full = true;
    }
    config.validate()?;

    if !args.topology.exists() {
        return Err(CliError::TopologyNotFound {
            path: args.topology.clone(),
        });
    }
    let topology_text = fs::read_to_string(&args.topology)?;

    let resolution = run_pipeline(&topology_text, &config)?;
    info!(
        configurations = resolution.resolved.len(),
        machine = %config.machine,
        "resolved multiconfig set"
    );

    if args.dry_run {
        for resolved in &resolution.resolved {
            if resolved.candidate.name.is_empty() {
                continue;
            }
            println!(
                "would write conf/multiconfig/{}.conf",
                resolved.conf_stem(&config.machine)
            );
        }
        println!("would write conf/{}-overrides.conf", config.machine);
        return Ok(());
    }

    let summary = Synthesizer::new(&config, &args.root).synthesize(&resolution)?;
    for path in &summary.written {
        info!(path = %path.display(), "wrote");
    }
    if !summary.is_clean() {
        for (path, err) in &summary.failed {
            warn!(path = %path.display(), error = %err, "write failed");
        }
        return Err(CliError::PartialWrite {
            count: summary.failed.len(),
        });
    }
    Ok(())
}
