use std::{net::SocketAddr, path::PathBuf};

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use crowdsale_config::ExportConfig;
use crowdsale_export::Exporter;
use crowdsale_primitives::format_ether;

use crate::devnet;

#[derive(Parser, Debug)]
#[command(name = "crowdsale")]
#[command(about = "Export crowdsale contributions to CSV")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Write one CSV row per backer from the contract's FundTransfer events.
    Export(ExportArgs),
    /// Serve an in-memory Edgeless sale over JSON-RPC until interrupted.
    Devnet(DevnetArgs),
}

#[derive(clap::Args, Debug)]
pub(crate) struct ExportArgs {
    /// TOML or JSON config file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Node JSON-RPC endpoint.
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Crowdsale contract address.
    #[arg(long)]
    pub contract: Option<Address>,

    /// CSV destination.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// First block to scan.
    #[arg(long)]
    pub from_block: Option<u64>,

    /// Last block to scan; defaults to the latest.
    #[arg(long)]
    pub to_block: Option<u64>,

    /// Blocks per eth_getLogs request.
    #[arg(long)]
    pub chunk_size: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write a header row.
    #[arg(long)]
    pub header: bool,
    /// Leave refund events out of the totals.
    #[arg(long)]
    pub contributions_only: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct DevnetArgs {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:8545")]
    pub addr: SocketAddr,

    /// Number of backers buying into the sale before serving.
    #[arg(long, default_value_t = 5)]
    pub backers: usize,
}

impl ExportArgs {
    pub(crate) fn load_config(&self) -> eyre::Result<ExportConfig> {
        let mut config = ExportConfig::load(self.config.as_deref())?;

        if let Some(ref url) = self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(contract) = self.contract {
            config.contract = contract;
        }
        if let Some(ref output) = self.output {
            config.output = output.clone();
        }
        if let Some(from_block) = self.from_block {
            config.from_block = from_block;
        }
        if let Some(to_block) = self.to_block {
            config.to_block = Some(to_block);
        }
        if let Some(chunk_size) = self.chunk_size {
            config.log_chunk_size = Some(chunk_size);
        }
        if let Some(timeout) = self.timeout {
            config.rpc.request_timeout_secs = timeout;
        }
        if self.header {
            config.header = true;
        }
        if self.contributions_only {
            config.contributions_only = true;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Cli {
    pub(crate) fn run(self) -> eyre::Result<()> {
        match &self.command {
            Commands::Export(args) => run_export(args),
            Commands::Devnet(args) => devnet::run(args.addr, args.backers),
        }
    }
}

fn run_export(args: &ExportArgs) -> eyre::Result<()> {
    let config = args.load_config()?;
    tracing::info!(contract = %config.contract, rpc = %config.rpc.url, "Starting export");
    tracing::debug!(?config, "Full configuration");

    let exporter = Exporter::connect(config)?;
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let summary = rt.block_on(exporter.run())?;

    tracing::info!(
        backers = summary.backers,
        events = summary.events,
        refunds = summary.refunds,
        refunds_skipped = summary.refunds_skipped,
        total = %format_ether(summary.total_raised),
        path = %summary.output.display(),
        "OK"
    );
    Ok(())
}
