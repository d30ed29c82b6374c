#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod client;
pub use client::{HttpClient, NodeClient};

mod error;
pub use error::{RpcError, codes as error_codes};

mod eth;
pub use eth::{EthApiImpl, EthApiServer};

mod server;
pub use server::{DEFAULT_MAX_CONNECTIONS, JsonRpcServer, RpcServerHandle, ServerError};

mod types;
pub use types::{
    AddressFilter, BlockNumberOrTag, BlockTag, CallRequest, RpcBlock, RpcLog, RpcLogFilter,
    TopicFilter,
};
