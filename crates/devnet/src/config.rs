//! Chain parameters.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Default chain ID for local development.
pub const DEFAULT_CHAIN_ID: u64 = 1337;

/// Default genesis time: one hour before the Edgeless sale opens.
pub const DEFAULT_GENESIS_TIMESTAMP: u64 = 1_488_290_400;

/// Default seconds between blocks.
pub const DEFAULT_BLOCK_TIME: u64 = 15;

/// Default gas price in wei.
pub const DEFAULT_GAS_PRICE: u64 = 1;

/// Gas charged for every transaction.
pub const DEFAULT_INTRINSIC_GAS: u64 = 21_000;

/// Default per-block gas limit.
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 4_712_388;

/// Configuration of a [`TestChain`](crate::TestChain).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain ID.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Timestamp of block 0.
    #[serde(default = "default_genesis_timestamp")]
    pub genesis_timestamp: u64,
    /// Seconds added to the timestamp for each mined block.
    #[serde(default = "default_block_time")]
    pub block_time: u64,
    /// Wei charged per unit of gas.
    #[serde(default = "default_gas_price")]
    pub gas_price: u64,
    /// Flat gas cost of a transaction.
    #[serde(default = "default_intrinsic_gas")]
    pub intrinsic_gas: u64,
    /// Gas limit reported on blocks.
    #[serde(default = "default_block_gas_limit")]
    pub block_gas_limit: u64,
    /// Account collecting transaction fees.
    #[serde(default)]
    pub coinbase: Address,
}

const fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

const fn default_genesis_timestamp() -> u64 {
    DEFAULT_GENESIS_TIMESTAMP
}

const fn default_block_time() -> u64 {
    DEFAULT_BLOCK_TIME
}

const fn default_gas_price() -> u64 {
    DEFAULT_GAS_PRICE
}

const fn default_intrinsic_gas() -> u64 {
    DEFAULT_INTRINSIC_GAS
}

const fn default_block_gas_limit() -> u64 {
    DEFAULT_BLOCK_GAS_LIMIT
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            genesis_timestamp: DEFAULT_GENESIS_TIMESTAMP,
            block_time: DEFAULT_BLOCK_TIME,
            gas_price: DEFAULT_GAS_PRICE,
            intrinsic_gas: DEFAULT_INTRINSIC_GAS,
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            coinbase: Address::ZERO,
        }
    }
}

impl ChainConfig {
    /// Set the chain ID.
    #[must_use]
    pub const fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the genesis timestamp.
    #[must_use]
    pub const fn with_genesis_timestamp(mut self, timestamp: u64) -> Self {
        self.genesis_timestamp = timestamp;
        self
    }

    /// Set seconds between blocks.
    #[must_use]
    pub const fn with_block_time(mut self, block_time: u64) -> Self {
        self.block_time = block_time;
        self
    }

    /// Set the gas price.
    #[must_use]
    pub const fn with_gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Set the fee recipient.
    #[must_use]
    pub const fn with_coinbase(mut self, coinbase: Address) -> Self {
        self.coinbase = coinbase;
        self
    }

    /// Wei charged for a transaction.
    pub const fn tx_fee(&self) -> u128 {
        self.intrinsic_gas as u128 * self.gas_price as u128
    }
}
