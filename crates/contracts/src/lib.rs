#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod abi;

mod balances;
pub use balances::Balances;

mod clock;
pub use clock::Clock;

mod context;
pub use context::CallContext;

mod crowdsale;
pub use crowdsale::Crowdsale;

mod error;
pub use error::ContractError;

mod params;
pub use params::{
    CrowdsaleParams, EDGELESS_DEADLINES, EDGELESS_FUNDING_GOAL, EDGELESS_MAX_GOAL,
    EDGELESS_PRICES, EDGELESS_START, TOKEN_DECIMALS, TOKEN_INITIAL_SUPPLY, TOKEN_NAME,
    TOKEN_RETAINED_SUPPLY, TOKEN_STANDARD, TOKEN_SYMBOL,
};

mod token;
pub use token::EdgelessToken;
