//! mcgen - multiconfig build-configuration generator.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;

use error::CliError;

/// mcgen: derive multiconfig build configurations from a hardware topology.
#[derive(Debug, Parser)]
#[command(name = "mcgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (can be repeated: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path (defaults to discovering mcgen.toml upward).
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate multiconfig descriptors and the machine-override fragment.
    #[command(visible_alias = "g")]
    Generate(commands::GenerateArgs),

    /// List the candidate configurations a topology expands to.
    ///
    /// Shows every candidate with its selection status under the current
    /// configuration, without writing anything.
    #[command(visible_alias = "l")]
    List(commands::ListArgs),

    /// Show version information.
    Version,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("{level},mcgen={level}")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Generate(args) => commands::generate::execute(args, cli.config.as_deref()),
        Command::List(args) => commands::list::execute(args, cli.config.as_deref()),
        Command::Version => {
            print_version();
            Ok(())
        }
    };

    result.map(|_| ExitCode::SUCCESS).unwrap_or_else(|e: CliError| {
        eprintln!("{e}");
        ExitCode::from(e.exit_code() as u8)
    })
}

/// Print version information.
fn print_version() {
    println!("mcgen {}", env!("CARGO_PKG_VERSION"));
    println!("Target: {}", std::env::consts::ARCH);
    println!("OS: {}", std::env::consts::OS);
}
