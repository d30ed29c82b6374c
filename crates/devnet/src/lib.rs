#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod chain;
pub use chain::{TestChain, TxRequest};

mod config;
pub use config::{
    ChainConfig, DEFAULT_BLOCK_GAS_LIMIT, DEFAULT_BLOCK_TIME, DEFAULT_CHAIN_ID, DEFAULT_GAS_PRICE,
    DEFAULT_GENESIS_TIMESTAMP, DEFAULT_INTRINSIC_GAS,
};

mod contracts;
pub use contracts::ContractSet;

mod edgeless;
pub use edgeless::{
    Accounts, Deployment, EdgelessContracts, PURCHASE_GAS, contract_address, initial_balance,
};

mod error;
pub use error::ChainError;

mod filter;
pub use filter::LogFilter;

mod index;
pub use index::BlockIndex;

mod shared;
pub use shared::SharedChain;

mod types;
pub use types::{IndexedBlock, IndexedLog, IndexedReceipt, IndexedTransaction};
