#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub use alloy_primitives::{Address, B256, Bytes, Log, LogData, U64, U256, keccak256};

pub mod units;
pub use units::{UnitsError, WEI_PER_ETHER, ether, format_ether, parse_ether};
