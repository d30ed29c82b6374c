//! Indexed types for blocks, transactions, receipts, and logs.

use alloy_primitives::{Address, B256, Bytes, U256};

/// A mined block: header fields and transaction hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBlock {
    /// Block hash.
    pub hash: B256,
    /// Block number.
    pub number: u64,
    /// Parent block hash.
    pub parent_hash: B256,
    /// Block timestamp.
    pub timestamp: u64,
    /// Gas limit for this block.
    pub gas_limit: u64,
    /// Gas used by all transactions in this block.
    pub gas_used: u64,
    /// Fee recipient.
    pub miner: Address,
    /// Hashes of transactions included in this block.
    pub transaction_hashes: Vec<B256>,
}

/// A mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedTransaction {
    /// Transaction hash.
    pub hash: B256,
    /// Hash of the block containing this transaction.
    pub block_hash: B256,
    /// Number of the block containing this transaction.
    pub block_number: u64,
    /// Index of the transaction within the block.
    pub index: u64,
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Value transferred.
    pub value: U256,
    /// Gas limit for this transaction.
    pub gas_limit: u64,
    /// Input data.
    pub input: Bytes,
    /// Sender nonce.
    pub nonce: u64,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedReceipt {
    /// Transaction hash.
    pub transaction_hash: B256,
    /// Hash of the block containing this transaction.
    pub block_hash: B256,
    /// Number of the block containing this transaction.
    pub block_number: u64,
    /// Index of the transaction within the block.
    pub transaction_index: u64,
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Gas used by this transaction.
    pub gas_used: u64,
    /// Logs emitted by this transaction.
    pub logs: Vec<IndexedLog>,
}

/// A log with its position on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedLog {
    /// Address of the contract that emitted the log.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<B256>,
    /// Non-indexed data.
    pub data: Bytes,
    /// Number of the containing block.
    pub block_number: u64,
    /// Hash of the containing block.
    pub block_hash: B256,
    /// Hash of the emitting transaction.
    pub transaction_hash: B256,
    /// Index of the emitting transaction within the block.
    pub transaction_index: u64,
    /// Log index within the block.
    pub log_index: u64,
}
