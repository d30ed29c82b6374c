//! Native currency ledger.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::ContractError;

/// Wei balances of every account on the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balances {
    accounts: HashMap<Address, U256>,
}

impl Balances {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the balance of `account`, zero if it never held funds.
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    /// Mints `amount` into `account`.
    pub fn credit(&mut self, account: Address, amount: U256) -> Result<(), ContractError> {
        let balance = self.accounts.entry(account).or_default();
        *balance = balance.checked_add(amount).ok_or(ContractError::Overflow)?;
        Ok(())
    }

    /// Burns `amount` from `account`.
    pub fn debit(&mut self, account: Address, amount: U256) -> Result<(), ContractError> {
        let have = self.balance_of(&account);
        let remaining = have.checked_sub(amount).ok_or(ContractError::InsufficientFunds {
            account,
            need: amount,
            have,
        })?;
        self.accounts.insert(account, remaining);
        Ok(())
    }

    /// Moves `amount` from `from` to `to`. On error neither side changes.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ContractError> {
        let have = self.balance_of(&from);
        let remaining = have.checked_sub(amount).ok_or(ContractError::InsufficientFunds {
            account: from,
            need: amount,
            have,
        })?;
        if from == to {
            return Ok(());
        }
        let credited = self.balance_of(&to).checked_add(amount).ok_or(ContractError::Overflow)?;
        self.accounts.insert(from, remaining);
        self.accounts.insert(to, credited);
        Ok(())
    }

    /// Sum of all balances.
    pub fn total(&self) -> U256 {
        self.accounts.values().fold(U256::ZERO, |acc, v| acc.saturating_add(*v))
    }
}

impl FromIterator<(Address, U256)> for Balances {
    fn from_iter<I: IntoIterator<Item = (Address, U256)>>(iter: I) -> Self {
        Self { accounts: iter.into_iter().collect() }
    }
}
