//! The export pipeline.

use std::{collections::HashMap, fs::File, io::BufWriter, path::PathBuf};

use alloy_primitives::U256;
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use crowdsale_config::{ConfigError, ExportConfig};
use crowdsale_contracts::abi::{FundTransfer, amountRaisedCall};
use crowdsale_primitives::format_ether;
use crowdsale_rpc::{BlockNumberOrTag, CallRequest, HttpClient, NodeClient, RpcLog, RpcLogFilter};
use tracing::{debug, info};

use crate::{ContributionLedger, ExportError, FundTransferRecord, write_csv};

/// Outcome of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Chain head when the run started.
    pub block_number: u64,
    /// `amountRaised()` reported by the contract.
    pub amount_raised: U256,
    /// `FundTransfer` logs fetched.
    pub events: usize,
    /// Refund events among them.
    pub refunds: usize,
    /// Refund events left out of the report.
    pub refunds_skipped: usize,
    /// Rows written.
    pub backers: usize,
    /// Sum of the reported amounts.
    pub total_raised: U256,
    /// Where the CSV went.
    pub output: PathBuf,
}

/// Reads `FundTransfer` events through a [`NodeClient`] and writes the CSV report.
#[derive(Debug)]
pub struct Exporter<C> {
    client: C,
    config: ExportConfig,
}

impl Exporter<HttpClient> {
    /// Connects to the node named in `config` over HTTP.
    pub fn connect(config: ExportConfig) -> Result<Self, ExportError> {
        let client = HttpClient::new(config.rpc.url.clone(), config.rpc.request_timeout())?;
        Self::new(client, config)
    }
}

impl<C: NodeClient> Exporter<C> {
    /// Creates an exporter reading through `client`.
    pub fn new(client: C, config: ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// Export settings.
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Runs the export and writes the report to the configured output.
    pub async fn run(&self) -> Result<ExportSummary, ExportError> {
        let block_number = self.client.block_number().await?;
        info!(block = block_number, "connected to node");

        let amount_raised = self.amount_raised(block_number).await?;
        info!(raised = %format_ether(amount_raised), "crowdsale amount raised");

        let logs = self.fetch_logs(block_number).await?;
        let events = logs.len();
        info!(events, "fetched FundTransfer events");

        let (ledger, refunds, refunds_skipped) = self.aggregate(logs).await?;
        let total_raised = ledger.total()?;

        let output = self.config.output.clone();
        self.write(&ledger)?;
        info!(
            backers = ledger.len(),
            total = %format_ether(total_raised),
            path = %output.display(),
            "wrote report"
        );

        Ok(ExportSummary {
            block_number,
            amount_raised,
            events,
            refunds,
            refunds_skipped,
            backers: ledger.len(),
            total_raised,
            output,
        })
    }

    /// Fetches and aggregates the events without writing anything.
    pub async fn collect(&self) -> Result<ContributionLedger, ExportError> {
        let head = self.client.block_number().await?;
        let logs = self.fetch_logs(head).await?;
        Ok(self.aggregate(logs).await?.0)
    }

    async fn amount_raised(&self, block: u64) -> Result<U256, ExportError> {
        let request = CallRequest::new(self.config.contract, amountRaisedCall {}.abi_encode());
        let out = self.client.call(request, None).await?;
        U256::abi_decode(&out).map_err(|e| ExportError::Decode {
            what: "amountRaised",
            block,
            reason: e.to_string(),
        })
    }

    /// `FundTransfer` logs in the configured range, sorted by chain position.
    async fn fetch_logs(&self, head: u64) -> Result<Vec<RpcLog>, ExportError> {
        let from = self.config.from_block;
        let to = self.config.to_block.unwrap_or(head);
        if to < from {
            return Err(ConfigError::InvalidBlockRange { from, to }.into());
        }
        let chunk = self.config.log_chunk_size.unwrap_or((to - from).saturating_add(1)).max(1);

        let mut logs = Vec::new();
        let mut start = from;
        loop {
            let end = start.saturating_add(chunk - 1).min(to);
            let filter = RpcLogFilter::new()
                .from_block(start)
                .to_block(end)
                .address(self.config.contract)
                .event_signature(FundTransfer::SIGNATURE_HASH);
            let batch = self.client.logs(filter).await?;
            debug!(from = start, to = end, count = batch.len(), "fetched log chunk");
            logs.extend(batch);

            if end >= to {
                break;
            }
            start = end + 1;
        }

        logs.retain(|log| !log.removed);
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        Ok(logs)
    }

    /// Folds every event into a ledger, returning it with the number of
    /// refunds seen and skipped. Refunds count like contributions unless
    /// `contributions_only` is set.
    async fn aggregate(
        &self,
        logs: Vec<RpcLog>,
    ) -> Result<(ContributionLedger, usize, usize), ExportError> {
        let mut ledger = ContributionLedger::new();
        let mut timestamps: HashMap<u64, u64> = HashMap::new();
        let (mut refunds, mut skipped) = (0, 0);

        for log in &logs {
            let record = FundTransferRecord::from_log(log)?;
            if !record.is_contribution {
                refunds += 1;
                if self.config.contributions_only {
                    skipped += 1;
                    continue;
                }
            }

            let timestamp = match timestamps.get(&record.block_number) {
                Some(&timestamp) => timestamp,
                None => {
                    let timestamp = self.block_timestamp(record.block_number).await?;
                    timestamps.insert(record.block_number, timestamp);
                    timestamp
                }
            };
            ledger.record(record.backer, timestamp, record.amount)?;
        }

        debug!(backers = ledger.len(), refunds, skipped, "aggregated events");
        Ok((ledger, refunds, skipped))
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64, ExportError> {
        let block = self
            .client
            .block_by_number(BlockNumberOrTag::from(number))
            .await?
            .ok_or(ExportError::MissingBlock(number))?;
        Ok(block.timestamp.to::<u64>())
    }

    fn write(&self, ledger: &ContributionLedger) -> Result<(), ExportError> {
        let path = &self.config.output;
        let file = File::create(path)
            .map_err(|source| ExportError::Io { path: path.clone(), source })?;
        write_csv(BufWriter::new(file), ledger, self.config.header)
    }
}
