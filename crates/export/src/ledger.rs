//! Per-backer contribution totals.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::ExportError;

/// Everything one address contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// Backer.
    pub address: Address,
    /// Earliest block timestamp of a payment.
    pub first_payment: u64,
    /// Total wei contributed.
    pub raised: U256,
}

/// Contributions keyed by address, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ContributionLedger {
    entries: Vec<Contribution>,
    index: HashMap<Address, usize>,
}

impl ContributionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a payment of `amount` wei made at `timestamp`.
    ///
    /// Keeps the earliest timestamp seen for the address. Fails rather than
    /// wrap if the running total overflows.
    pub fn record(
        &mut self,
        address: Address,
        timestamp: u64,
        amount: U256,
    ) -> Result<(), ExportError> {
        let Some(&slot) = self.index.get(&address) else {
            self.index.insert(address, self.entries.len());
            self.entries.push(Contribution { address, first_payment: timestamp, raised: amount });
            return Ok(());
        };

        let entry = &mut self.entries[slot];
        entry.raised = entry.raised.checked_add(amount).ok_or(ExportError::Overflow(address))?;
        entry.first_payment = entry.first_payment.min(timestamp);
        Ok(())
    }

    /// Contribution of `address`, if any.
    pub fn get(&self, address: &Address) -> Option<&Contribution> {
        self.index.get(address).map(|&slot| &self.entries[slot])
    }

    /// Contributions in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Contribution> {
        self.entries.iter()
    }

    /// Number of distinct backers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over all backers.
    pub fn total(&self) -> Result<U256, ExportError> {
        self.entries.iter().try_fold(U256::ZERO, |acc, entry| {
            acc.checked_add(entry.raised).ok_or(ExportError::Overflow(entry.address))
        })
    }
}
