//! Crowdsale contribution exporter and local devnet.

use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

mod cli;
mod devnet;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    cli.run()
}
