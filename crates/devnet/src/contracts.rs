//! Contracts deployed on a test chain.

use alloy_primitives::{Address, Bytes};
use crowdsale_contracts::{CallContext, ContractError};

/// The contracts living on a [`TestChain`](crate::TestChain).
///
/// The chain clones the set before each transaction and keeps the clone only
/// if the transaction succeeds, so implementations must be cheap enough to
/// clone and must not share state across clones.
pub trait ContractSet: Clone + Send + Sync + 'static {
    /// Whether a contract is deployed at `address`.
    fn contains(&self, address: &Address) -> bool;

    /// Handles a plain payment to the contract at `to`.
    ///
    /// The attached value is already credited to `to` when this runs.
    fn receive(&mut self, to: Address, ctx: &mut CallContext<'_>) -> Result<(), ContractError>;

    /// Answers a read-only ABI call to the contract at `to`.
    fn call(&self, to: Address, input: &[u8], timestamp: u64) -> Result<Bytes, ContractError>;
}

/// A chain without contracts.
impl ContractSet for () {
    fn contains(&self, _address: &Address) -> bool {
        false
    }

    fn receive(&mut self, to: Address, _ctx: &mut CallContext<'_>) -> Result<(), ContractError> {
        Err(ContractError::UnknownContract(to))
    }

    fn call(&self, to: Address, _input: &[u8], _timestamp: u64) -> Result<Bytes, ContractError> {
        Err(ContractError::UnknownContract(to))
    }
}
