//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize configuration to TOML.
    #[error("failed to serialize config to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("failed to parse JSON config: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The requested block range is empty.
    #[error("invalid block range: from {from} > to {to}")]
    InvalidBlockRange {
        /// First block of the range.
        from: u64,
        /// Last block of the range.
        to: u64,
    },

    /// Log chunks must span at least one block.
    #[error("log chunk size must be at least 1")]
    InvalidChunkSize,
}
