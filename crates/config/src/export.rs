//! Export job configuration.

use std::path::{Path, PathBuf};

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, RpcConfig};

/// The Edgeless crowdsale deployed on mainnet.
pub const DEFAULT_CONTRACT: Address = address!("362bb67f7fdbdd0dbba4bce16da6a284cf484ed6");

/// Default CSV output path.
pub const DEFAULT_OUTPUT: &str = "transactions.csv";

/// Configuration of a single export run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    /// Address of the crowdsale contract emitting `FundTransfer`.
    #[serde(default = "default_contract")]
    pub contract: Address,

    /// Destination of the CSV report.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// First block to scan (inclusive).
    #[serde(default)]
    pub from_block: u64,

    /// Last block to scan (inclusive). `None` scans up to the latest block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,

    /// Maximum number of blocks per `eth_getLogs` request.
    ///
    /// `None` fetches the whole range in one request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_chunk_size: Option<u64>,

    /// Whether to emit a header row.
    #[serde(default)]
    pub header: bool,

    /// Leave refund events out of the totals.
    ///
    /// By default every `FundTransfer` counts towards the backer's row,
    /// refunds included.
    #[serde(default)]
    pub contributions_only: bool,

    /// Node connection settings.
    #[serde(default)]
    pub rpc: RpcConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT,
            output: PathBuf::from(DEFAULT_OUTPUT),
            from_block: 0,
            to_block: None,
            log_chunk_size: None,
            header: false,
            contributions_only: false,
            rpc: RpcConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Loads configuration from `path`, or returns defaults when no path is given.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        debug!(path = %path.display(), "loaded export config");
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration to `path` as TOML.
    pub fn save_toml(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }

    /// Checks that the block range and chunk size are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(to) = self.to_block
            && to < self.from_block
        {
            return Err(ConfigError::InvalidBlockRange { from: self.from_block, to });
        }
        if let Some(0) = self.log_chunk_size {
            return Err(ConfigError::InvalidChunkSize);
        }
        Ok(())
    }
}

const fn default_contract() -> Address {
    DEFAULT_CONTRACT
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("crowdsale-config-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_default_export_config() {
        let config = ExportConfig::default();
        assert_eq!(config.contract, DEFAULT_CONTRACT);
        assert_eq!(config.output, PathBuf::from("transactions.csv"));
        assert_eq!(config.from_block, 0);
        assert!(config.to_block.is_none());
        assert!(config.log_chunk_size.is_none());
        assert!(!config.header);
        assert!(!config.contributions_only);
    }

    #[test]
    fn test_default_contract_address() {
        assert_eq!(
            DEFAULT_CONTRACT.to_string().to_lowercase(),
            "0x362bb67f7fdbdd0dbba4bce16da6a284cf484ed6"
        );
    }

    #[test]
    fn test_load_without_path_returns_defaults() {
        let config = ExportConfig::load(None).expect("defaults");
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ExportConfig = toml::from_str("").expect("deserialize");
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_load_toml_file() {
        let path = scratch_path("load.toml");
        std::fs::write(
            &path,
            r#"
contract = "0x00000000000000000000000000000000000000aa"
output = "out.csv"
from_block = 3200000
to_block = 3400000
log_chunk_size = 5000
header = true
contributions_only = true

[rpc]
url = "http://archive:8545"
"#,
        )
        .expect("write");

        let config = ExportConfig::load(Some(&path)).expect("load");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.contract, Address::with_last_byte(0xaa));
        assert_eq!(config.output, PathBuf::from("out.csv"));
        assert_eq!(config.from_block, 3_200_000);
        assert_eq!(config.to_block, Some(3_400_000));
        assert_eq!(config.log_chunk_size, Some(5000));
        assert!(config.header);
        assert!(config.contributions_only);
        assert_eq!(config.rpc.url, "http://archive:8545");
        assert_eq!(config.rpc.request_timeout_secs, crate::DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_json_file() {
        let path = scratch_path("load.json");
        std::fs::write(&path, r#"{"from_block": 7, "rpc": {"request_timeout_secs": 5}}"#)
            .expect("write");

        let config = ExportConfig::load(Some(&path)).expect("load");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.from_block, 7);
        assert_eq!(config.rpc.request_timeout_secs, 5);
        assert_eq!(config.contract, DEFAULT_CONTRACT);
    }

    #[test]
    fn test_load_missing_file() {
        let path = scratch_path("missing.toml");
        let err = ExportConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_rejects_inverted_range() {
        let path = scratch_path("inverted.toml");
        std::fs::write(&path, "from_block = 10\nto_block = 5\n").expect("write");

        let err = ExportConfig::load(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::InvalidBlockRange { from: 10, to: 5 }));
    }

    #[test]
    fn test_validate_rejects_zero_chunk() {
        let config = ExportConfig { log_chunk_size: Some(0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidChunkSize)));
    }

    #[test]
    fn test_save_and_reload_toml() {
        let path = scratch_path("roundtrip.toml");
        let config = ExportConfig {
            to_block: Some(99),
            log_chunk_size: Some(10),
            header: true,
            ..Default::default()
        };

        config.save_toml(&path).expect("save");
        let loaded = ExportConfig::load(Some(&path)).expect("load");
        std::fs::remove_file(&path).ok();

        assert_eq!(config, loaded);
    }
}
