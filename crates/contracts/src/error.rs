//! Contract revert reasons.

use alloy_primitives::{Address, Selector, U256};
use thiserror::Error;

/// Reasons a contract call reverts.
///
/// A reverted call leaves no trace: the caller is expected to roll back
/// every balance and state change made during the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Not enough native currency to cover a payment.
    #[error("insufficient funds for {account}: need {need}, have {have}")]
    InsufficientFunds {
        /// Paying account.
        account: Address,
        /// Required amount in wei.
        need: U256,
        /// Available amount in wei.
        have: U256,
    },

    /// Not enough tokens to cover a transfer.
    #[error("insufficient token balance for {account}: need {need}, have {have}")]
    InsufficientBalance {
        /// Token holder.
        account: Address,
        /// Required token amount.
        need: U256,
        /// Available token amount.
        have: U256,
    },

    /// The spender's allowance does not cover a delegated transfer.
    #[error("allowance of {spender} over {owner} is {have}, need {need}")]
    InsufficientAllowance {
        /// Token holder.
        owner: Address,
        /// Delegated spender.
        spender: Address,
        /// Required allowance.
        need: U256,
        /// Current allowance.
        have: U256,
    },

    /// Token transfers are locked until the sale ends.
    #[error("transfers locked until {start_time}, now {now}")]
    TransfersLocked {
        /// Current contract time.
        now: u64,
        /// Unlock time.
        start_time: u64,
    },

    /// The caller is not allowed to invoke this method.
    #[error("unauthorized caller: {0}")]
    Unauthorized(Address),

    /// The payment does not buy a single token at the current price.
    #[error("value {value} below token price {price}")]
    ValueBelowPrice {
        /// Paid amount in wei.
        value: U256,
        /// Current price in wei per token.
        price: U256,
    },

    /// The sale has not opened yet.
    #[error("sale starts at {start}, now {now}")]
    NotStarted {
        /// Current contract time.
        now: u64,
        /// Opening time.
        start: u64,
    },

    /// The sale was closed by the goal check.
    #[error("sale closed")]
    SaleClosed,

    /// The purchase would sell more than the maximum goal.
    #[error("purchase of {requested} tokens exceeds remaining allocation {available}")]
    MaxGoalExceeded {
        /// Tokens the payment would buy.
        requested: U256,
        /// Tokens still for sale.
        available: U256,
    },

    /// Refunds are only paid when the funding goal was missed.
    #[error("funding goal reached, refunds unavailable")]
    GoalReached,

    /// Arithmetic overflow or underflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// The contract rejects plain payments.
    #[error("contract {0} does not accept payments")]
    NotPayable(Address),

    /// No contract is deployed at the address.
    #[error("no contract at {0}")]
    UnknownContract(Address),

    /// The contract has no method with this selector.
    #[error("unknown selector {0}")]
    UnknownSelector(Selector),

    /// Call data could not be decoded.
    #[error("invalid call data: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_display() {
        let err = ContractError::InsufficientFunds {
            account: Address::ZERO,
            need: U256::from(10u64),
            have: U256::from(3u64),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("insufficient funds for"));
        assert!(msg.contains("need 10, have 3"));
    }

    #[test]
    fn test_transfers_locked_display() {
        let err = ContractError::TransfersLocked { now: 5, start_time: 10 };
        assert_eq!(err.to_string(), "transfers locked until 10, now 5");
    }

    #[test]
    fn test_value_below_price_display() {
        let err = ContractError::ValueBelowPrice { value: U256::from(1u64), price: U256::from(7u64) };
        assert_eq!(err.to_string(), "value 1 below token price 7");
    }

    #[test]
    fn test_unknown_selector_display() {
        let err = ContractError::UnknownSelector(Selector::from([0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(err.to_string(), "unknown selector 0xdeadbeef");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContractError>();
    }
}
