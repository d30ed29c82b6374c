//! Export error types.

use std::path::PathBuf;

use alloy_primitives::Address;
use crowdsale_config::ConfigError;
use crowdsale_rpc::RpcError;
use thiserror::Error;

/// Errors that end an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The node request failed.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    /// A log or call result could not be ABI-decoded.
    #[error("failed to decode {what} at block {block}: {reason}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// Block the data belongs to.
        block: u64,
        /// Decoder message.
        reason: String,
    },

    /// The node does not know a block referenced by a log.
    #[error("block {0} not found")]
    MissingBlock(u64),

    /// A block timestamp cannot be represented as a date.
    #[error("block timestamp {0} out of range")]
    InvalidTimestamp(u64),

    /// A backer's running total overflowed.
    #[error("contribution total overflow for {0}")]
    Overflow(Address),

    /// Writing a CSV record failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The output file could not be created or flushed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The configuration is unusable.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
