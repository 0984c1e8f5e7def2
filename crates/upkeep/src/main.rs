//! upkeep - keeps a host-managed extension current with its published releases
//!
//! This is the main entry point for the upkeep command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.config.as_deref()).await,
        Commands::Check(args) => commands::check::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()),
        Commands::Version(args) => commands::version::run(args),
    }
}

/// Initialize tracing with appropriate verbosity.
///
/// `-q`/`-v` win; without them `RUST_LOG` is honoured, falling back to `info`.
fn init_tracing(verbose: u8, quiet: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(log_filter(verbose, quiet))
        .init();
}

fn log_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}
