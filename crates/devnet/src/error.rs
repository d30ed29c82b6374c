//! Devnet error types.

use alloy_primitives::Address;
use crowdsale_contracts::ContractError;
use thiserror::Error;

/// Reasons a transaction or query is rejected by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The transaction reverted; all of its effects were discarded.
    #[error("transaction reverted: {0}")]
    Reverted(#[from] ContractError),

    /// The gas limit does not cover the intrinsic cost.
    #[error("gas limit {gas} below intrinsic cost {intrinsic}")]
    GasTooLow {
        /// Gas limit of the transaction.
        gas: u64,
        /// Gas the transaction costs.
        intrinsic: u64,
    },

    /// The sender cannot pay the fee and value.
    #[error("sender {0} cannot pay for the transaction")]
    CannotPay(Address),

    /// A read-only call failed.
    #[error("call to {to} failed: {source}")]
    Call {
        /// Called contract.
        to: Address,
        /// Why the call failed.
        source: ContractError,
    },

    /// An indexed log does not decode as the requested event.
    #[error("log {log_index} in block {block} does not decode: {reason}")]
    InvalidLog {
        /// Block holding the log.
        block: u64,
        /// Position of the log within its block.
        log_index: u64,
        /// Decoder message.
        reason: String,
    },

    /// Invalid block range for log filter.
    #[error("invalid block range: from {from} > to {to}")]
    InvalidBlockRange {
        /// Start of the range.
        from: u64,
        /// End of the range.
        to: u64,
    },
}
