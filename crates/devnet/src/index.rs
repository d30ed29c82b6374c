//! In-memory block index.

use std::collections::HashMap;

use alloy_primitives::B256;
use tracing::debug;

use crate::{
    error::ChainError,
    filter::LogFilter,
    types::{IndexedBlock, IndexedLog, IndexedReceipt, IndexedTransaction},
};

/// Blocks, transactions, receipts and logs of the chain, in mining order.
///
/// Blocks are stored densely by number, so lookups by number and range
/// scans for logs are plain slice accesses.
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    blocks: Vec<IndexedBlock>,
    block_numbers: HashMap<B256, u64>,
    transactions: HashMap<B256, IndexedTransaction>,
    receipts: HashMap<B256, IndexedReceipt>,
    logs_by_block: Vec<Vec<IndexedLog>>,
}

impl BlockIndex {
    /// Creates a new empty block index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next block with its transactions and receipts.
    ///
    /// Block numbers must be consecutive starting from 0.
    pub fn insert_block(
        &mut self,
        block: IndexedBlock,
        txs: Vec<IndexedTransaction>,
        receipts: Vec<IndexedReceipt>,
    ) {
        debug_assert_eq!(block.number, self.blocks.len() as u64, "blocks must be consecutive");
        debug!(number = block.number, hash = %block.hash, txs = txs.len(), "indexing block");

        let logs = receipts.iter().flat_map(|r| r.logs.iter().cloned()).collect();
        self.logs_by_block.push(logs);
        self.block_numbers.insert(block.hash, block.number);
        self.blocks.push(block);
        self.transactions.extend(txs.into_iter().map(|tx| (tx.hash, tx)));
        self.receipts.extend(receipts.into_iter().map(|r| (r.transaction_hash, r)));
    }

    /// Gets a block by its hash.
    pub fn get_block_by_hash(&self, hash: &B256) -> Option<&IndexedBlock> {
        self.block_numbers.get(hash).and_then(|n| self.get_block_by_number(*n))
    }

    /// Gets a block by its number.
    pub fn get_block_by_number(&self, number: u64) -> Option<&IndexedBlock> {
        usize::try_from(number).ok().and_then(|n| self.blocks.get(n))
    }

    /// Gets a transaction by its hash.
    pub fn get_transaction(&self, hash: &B256) -> Option<&IndexedTransaction> {
        self.transactions.get(hash)
    }

    /// Gets a receipt by its transaction hash.
    pub fn get_receipt(&self, hash: &B256) -> Option<&IndexedReceipt> {
        self.receipts.get(hash)
    }

    /// Returns the latest block, if any.
    pub fn head(&self) -> Option<&IndexedBlock> {
        self.blocks.last()
    }

    /// Returns the current head block number.
    #[must_use]
    pub fn head_block_number(&self) -> u64 {
        self.head().map_or(0, |b| b.number)
    }

    /// Gets logs matching the given filter, in chain order.
    pub fn get_logs(&self, filter: &LogFilter) -> Result<Vec<IndexedLog>, ChainError> {
        let from = filter.from_block.unwrap_or(0);
        let to = filter.to_block.unwrap_or_else(|| self.head_block_number());
        if from > to {
            return Err(ChainError::InvalidBlockRange { from, to });
        }

        let end = usize::try_from(to).unwrap_or(usize::MAX).saturating_add(1);
        let start = usize::try_from(from).unwrap_or(usize::MAX);
        let logs = self
            .logs_by_block
            .get(start.min(self.logs_by_block.len())..end.min(self.logs_by_block.len()))
            .unwrap_or_default()
            .iter()
            .flatten()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect();
        Ok(logs)
    }

    /// Returns the total number of indexed blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the total number of indexed transactions.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Returns true if no block has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
