//! Configuration types for the crowdsale exporter.
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::ConfigError;

mod export;
pub use export::{DEFAULT_CONTRACT, DEFAULT_OUTPUT, ExportConfig};

mod rpc;
pub use rpc::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RPC_URL, RpcConfig};
