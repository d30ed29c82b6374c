//! Sale parameters.

use alloy_primitives::{Address, U256};

/// Name of the token.
pub const TOKEN_NAME: &str = "Edgeless";

/// Ticker of the token.
pub const TOKEN_SYMBOL: &str = "EDG";

/// Token standard reported by the contract.
pub const TOKEN_STANDARD: &str = "ERC20";

/// Tokens are indivisible.
pub const TOKEN_DECIMALS: u8 = 0;

/// Supply minted to the owner at deployment.
pub const TOKEN_INITIAL_SUPPLY: U256 = U256::from_limbs([500_000_000, 0, 0, 0]);

/// Owner balance left standing after the post-sale burn.
pub const TOKEN_RETAINED_SUPPLY: U256 = U256::from_limbs([60_000_000, 0, 0, 0]);

/// Opening time of the sale (2017-02-28 15:00 UTC).
pub const EDGELESS_START: u64 = 1_488_294_000;

/// End of each price tier. The last one closes the sale.
pub const EDGELESS_DEADLINES: [u64; 4] = [1_488_297_600, 1_488_902_400, 1_489_507_200, 1_490_112_000];

/// Wei per token within each tier.
pub const EDGELESS_PRICES: [U256; 4] = [
    U256::from_limbs([833_333_333_333_333, 0, 0, 0]),
    U256::from_limbs([909_090_909_090_909, 0, 0, 0]),
    U256::from_limbs([952_380_952_380_952, 0, 0, 0]),
    U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]),
];

/// Tokens that must sell for the sale to succeed.
pub const EDGELESS_FUNDING_GOAL: U256 = U256::from_limbs([50_000_000, 0, 0, 0]);

/// Tokens available for sale.
pub const EDGELESS_MAX_GOAL: U256 = U256::from_limbs([440_000_000, 0, 0, 0]);

/// Schedule, pricing and goals of a crowdsale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrowdsaleParams {
    /// Token owner whose supply is sold.
    pub beneficiary: Address,
    /// Wallet receiving contributions as they arrive.
    pub multisig: Address,
    /// Opening time.
    pub start: u64,
    /// End of each price tier, ascending.
    pub deadlines: [u64; 4],
    /// Wei per token within each tier.
    pub prices: [U256; 4],
    /// Minimum tokens sold for success.
    pub funding_goal: U256,
    /// Maximum tokens sold.
    pub max_goal: U256,
}

impl CrowdsaleParams {
    /// Parameters of the Edgeless sale.
    pub const fn edgeless(beneficiary: Address, multisig: Address) -> Self {
        Self {
            beneficiary,
            multisig,
            start: EDGELESS_START,
            deadlines: EDGELESS_DEADLINES,
            prices: EDGELESS_PRICES,
            funding_goal: EDGELESS_FUNDING_GOAL,
            max_goal: EDGELESS_MAX_GOAL,
        }
    }

    /// End of the sale.
    pub const fn end(&self) -> u64 {
        self.deadlines[self.deadlines.len() - 1]
    }

    /// Price in effect at `now`: the tier of the first deadline not yet
    /// passed, or the last tier once all deadlines are over.
    pub fn price_at(&self, now: u64) -> U256 {
        self.deadlines
            .iter()
            .zip(self.prices.iter())
            .find(|(deadline, _)| now < **deadline)
            .map_or(self.prices[self.prices.len() - 1], |(_, price)| *price)
    }
}
