//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// upkeep - keep an extension current with its published releases
#[derive(Parser, Debug)]
#[command(name = "upkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to upkeep.yaml (defaults to ~/.upkeep/upkeep.yaml)
    #[arg(short, long, global = true, env = "UPKEEP_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run update checks until interrupted
    Run(RunArgs),

    /// Run a single update check now
    Check(CheckArgs),

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the warm-up delay in seconds
    #[arg(long)]
    pub warmup: Option<u64>,

    /// Override the check interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Include the host token instead of masking it
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
