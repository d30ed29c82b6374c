//! Per-call execution context.

use alloy_primitives::{Address, Log, U256};
use alloy_sol_types::SolEvent;

use crate::Balances;

/// Environment of a single contract call.
///
/// Holds the caller, the attached value, the block timestamp, and mutable
/// access to the native ledger and the transaction's log buffer. Nested
/// calls between contracts re-borrow the same ledger and log buffer through
/// [`CallContext::with_sender`].
#[derive(Debug)]
pub struct CallContext<'a> {
    /// Immediate caller (`msg.sender`).
    pub sender: Address,
    /// Wei attached to the call (`msg.value`).
    pub value: U256,
    /// Timestamp of the block being built.
    pub timestamp: u64,
    balances: &'a mut Balances,
    logs: &'a mut Vec<Log>,
}

impl<'a> CallContext<'a> {
    /// Creates a context for a top-level call.
    pub const fn new(
        sender: Address,
        value: U256,
        timestamp: u64,
        balances: &'a mut Balances,
        logs: &'a mut Vec<Log>,
    ) -> Self {
        Self { sender, value, timestamp, balances, logs }
    }

    /// Context for a nested call made by `sender`, carrying no value.
    pub fn with_sender(&mut self, sender: Address) -> CallContext<'_> {
        CallContext {
            sender,
            value: U256::ZERO,
            timestamp: self.timestamp,
            balances: &mut *self.balances,
            logs: &mut *self.logs,
        }
    }

    /// Native currency ledger.
    pub fn balances(&mut self) -> &mut Balances {
        self.balances
    }

    /// Wei held by `account`.
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.balance_of(account)
    }

    /// Appends `event`, emitted by the contract at `address`, to the log buffer.
    pub fn emit<E: SolEvent>(&mut self, address: Address, event: &E) {
        self.logs.push(Log { address, data: event.encode_log_data() });
    }

    /// Logs emitted so far in this transaction.
    pub fn logs(&self) -> &[Log] {
        self.logs
    }
}
