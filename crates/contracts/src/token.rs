//! The Edgeless ERC-20 token.

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use tracing::debug;

use crate::{
    CallContext, Clock, ContractError, TOKEN_INITIAL_SUPPLY, TOKEN_RETAINED_SUPPLY,
    abi::{
        Approval, Burned, Transfer, allowanceCall, balanceOfCall, burnedCall, startTimeCall,
        totalSupplyCall,
    },
};

/// ERC-20 token whose transfers unlock at `start_time`.
///
/// Until then only the owner's tokens move, and only through
/// [`transfer_from`](Self::transfer_from) by an approved spender. This is how
/// the crowdsale hands out tokens while the sale runs.
#[derive(Clone, Debug)]
pub struct EdgelessToken {
    address: Address,
    owner: Address,
    total_supply: U256,
    start_time: u64,
    burned: bool,
    burner: Option<Address>,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    clock: Clock,
}

impl EdgelessToken {
    /// Deploys the token at `address`, minting the initial supply to `owner`.
    pub fn new(address: Address, owner: Address, start_time: u64) -> Self {
        Self {
            address,
            owner,
            total_supply: TOKEN_INITIAL_SUPPLY,
            start_time,
            burned: false,
            burner: None,
            balances: HashMap::from([(owner, TOKEN_INITIAL_SUPPLY)]),
            allowances: HashMap::new(),
            clock: Clock::default(),
        }
    }

    /// Address the token is deployed at.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Holder of the unsold supply.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Tokens in existence.
    pub const fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Time at which transfers unlock.
    pub const fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Whether the unsold supply has been burned.
    pub const fn burned(&self) -> bool {
        self.burned
    }

    /// Account allowed to trigger the burn.
    pub const fn burner(&self) -> Option<Address> {
        self.burner
    }

    /// Token balance of `account`.
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Tokens `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or_default()
    }

    /// Pins the token's clock.
    pub const fn set_current(&mut self, timestamp: u64) {
        self.clock.set_current(timestamp);
    }

    /// Moves `value` tokens from the caller to `to`.
    pub fn transfer(
        &mut self,
        ctx: &mut CallContext<'_>,
        to: Address,
        value: U256,
    ) -> Result<(), ContractError> {
        let now = self.clock.now(ctx.timestamp);
        if now < self.start_time {
            return Err(ContractError::TransfersLocked { now, start_time: self.start_time });
        }
        self.move_tokens(ctx.sender, to, value)?;
        ctx.emit(self.address, &Transfer { from: ctx.sender, to, value });
        Ok(())
    }

    /// Allows `spender` to move up to `value` of the caller's tokens.
    pub fn approve(&mut self, ctx: &mut CallContext<'_>, spender: Address, value: U256) {
        self.allowances.insert((ctx.sender, spender), value);
        ctx.emit(self.address, &Approval { owner: ctx.sender, spender, value });
    }

    /// Moves `value` tokens from `from` to `to` against the caller's allowance.
    ///
    /// Allowed while transfers are locked only when `from` is the owner.
    pub fn transfer_from(
        &mut self,
        ctx: &mut CallContext<'_>,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), ContractError> {
        let now = self.clock.now(ctx.timestamp);
        if now < self.start_time && from != self.owner {
            return Err(ContractError::TransfersLocked { now, start_time: self.start_time });
        }

        let spender = ctx.sender;
        let have = self.allowance(&from, &spender);
        let remaining = have.checked_sub(value).ok_or(ContractError::InsufficientAllowance {
            owner: from,
            spender,
            need: value,
            have,
        })?;

        self.move_tokens(from, to, value)?;
        self.allowances.insert((from, spender), remaining);
        ctx.emit(self.address, &Transfer { from, to, value });
        Ok(())
    }

    /// Authorises `burner` to trigger [`burn`](Self::burn). Owner only.
    pub fn set_burner(
        &mut self,
        ctx: &CallContext<'_>,
        burner: Address,
    ) -> Result<(), ContractError> {
        if ctx.sender != self.owner {
            return Err(ContractError::Unauthorized(ctx.sender));
        }
        self.burner = Some(burner);
        Ok(())
    }

    /// Destroys the owner's tokens above the retained supply.
    ///
    /// Runs once, after `start_time`. Earlier or repeated calls do nothing.
    /// Returns the amount burned.
    pub fn burn(&mut self, ctx: &mut CallContext<'_>) -> Result<U256, ContractError> {
        if self.burner != Some(ctx.sender) {
            return Err(ContractError::Unauthorized(ctx.sender));
        }

        let now = self.clock.now(ctx.timestamp);
        if self.burned || now <= self.start_time {
            return Ok(U256::ZERO);
        }

        let difference = self
            .balance_of(&self.owner)
            .checked_sub(TOKEN_RETAINED_SUPPLY)
            .ok_or(ContractError::Overflow)?;
        self.total_supply =
            self.total_supply.checked_sub(difference).ok_or(ContractError::Overflow)?;
        self.balances.insert(self.owner, TOKEN_RETAINED_SUPPLY);
        self.burned = true;

        debug!(amount = %difference, supply = %self.total_supply, "burned unsold tokens");
        ctx.emit(self.address, &Burned { amount: difference });
        Ok(difference)
    }

    /// Answers a read-only ABI call.
    pub fn call(&self, input: &[u8]) -> Result<Bytes, ContractError> {
        let selector = selector(input)?;
        let out = match selector {
            totalSupplyCall::SELECTOR => self.total_supply.abi_encode(),
            balanceOfCall::SELECTOR => {
                let call = balanceOfCall::abi_decode(input)
                    .map_err(|e| ContractError::InvalidInput(e.to_string()))?;
                self.balance_of(&call.owner).abi_encode()
            }
            allowanceCall::SELECTOR => {
                let call = allowanceCall::abi_decode(input)
                    .map_err(|e| ContractError::InvalidInput(e.to_string()))?;
                self.allowance(&call.owner, &call.spender).abi_encode()
            }
            burnedCall::SELECTOR => self.burned.abi_encode(),
            startTimeCall::SELECTOR => U256::from(self.start_time).abi_encode(),
            other => return Err(ContractError::UnknownSelector(other.into())),
        };
        Ok(out.into())
    }

    fn move_tokens(&mut self, from: Address, to: Address, value: U256) -> Result<(), ContractError> {
        let have = self.balance_of(&from);
        let remaining = have.checked_sub(value).ok_or(ContractError::InsufficientBalance {
            account: from,
            need: value,
            have,
        })?;
        if from == to {
            return Ok(());
        }
        let credited = self.balance_of(&to).checked_add(value).ok_or(ContractError::Overflow)?;
        self.balances.insert(from, remaining);
        self.balances.insert(to, credited);
        Ok(())
    }
}

/// Splits the 4-byte method selector off call data.
pub(crate) fn selector(input: &[u8]) -> Result<[u8; 4], ContractError> {
    input
        .get(..4)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .ok_or_else(|| ContractError::InvalidInput(format!("call data of {} bytes", input.len())))
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::SolEvent;

    use super::*;
    use crate::Balances;

    const START: u64 = 1_000;

    fn owner() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn token() -> EdgelessToken {
        EdgelessToken::new(Address::repeat_byte(0x70), owner(), START)
    }

    #[test]
    fn owner_holds_initial_supply() {
        let token = token();
        assert_eq!(token.balance_of(&owner()), TOKEN_INITIAL_SUPPLY);
        assert_eq!(token.total_supply(), TOKEN_INITIAL_SUPPLY);
        assert!(!token.burned());
    }

    #[test]
    fn transfer_is_locked_before_start() {
        let mut token = token();
        let mut balances = Balances::new();
        let mut logs = Vec::new();
        let mut ctx = CallContext::new(owner(), U256::ZERO, START - 1, &mut balances, &mut logs);

        let err = token.transfer(&mut ctx, Address::ZERO, U256::from(1u64)).unwrap_err();
        assert_eq!(err, ContractError::TransfersLocked { now: START - 1, start_time: START });

        token.set_current(START);
        token.transfer(&mut ctx, Address::ZERO, U256::from(1u64)).unwrap();
        assert_eq!(token.balance_of(&Address::ZERO), U256::from(1u64));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].topics()[0], Transfer::SIGNATURE_HASH);
    }

    #[test]
    fn owner_tokens_move_by_allowance_while_locked() {
        let mut token = token();
        let spender = Address::repeat_byte(0x5e);
        let buyer = Address::repeat_byte(0xb0);
        let mut balances = Balances::new();
        let mut logs = Vec::new();

        let mut ctx = CallContext::new(owner(), U256::ZERO, 0, &mut balances, &mut logs);
        token.approve(&mut ctx, spender, U256::from(100u64));

        let mut ctx = ctx.with_sender(spender);
        token.transfer_from(&mut ctx, owner(), buyer, U256::from(60u64)).unwrap();
        assert_eq!(token.allowance(&owner(), &spender), U256::from(40u64));
        assert_eq!(token.balance_of(&buyer), U256::from(60u64));

        let err = token.transfer_from(&mut ctx, owner(), buyer, U256::from(41u64)).unwrap_err();
        assert!(matches!(err, ContractError::InsufficientAllowance { .. }));

        // Buyer's tokens stay locked even with an allowance.
        let mut ctx = CallContext::new(buyer, U256::ZERO, 0, &mut balances, &mut logs);
        token.approve(&mut ctx, spender, U256::from(10u64));
        let mut ctx = ctx.with_sender(spender);
        let err = token.transfer_from(&mut ctx, buyer, owner(), U256::from(1u64)).unwrap_err();
        assert!(matches!(err, ContractError::TransfersLocked { .. }));
    }

    #[test]
    fn burn_requires_authorised_burner() {
        let mut token = token();
        let burner = Address::repeat_byte(0xbb);
        let mut balances = Balances::new();
        let mut logs = Vec::new();
        let mut ctx = CallContext::new(burner, U256::ZERO, START + 1, &mut balances, &mut logs);

        assert_eq!(token.burn(&mut ctx), Err(ContractError::Unauthorized(burner)));
        assert_eq!(token.set_burner(&ctx, burner), Err(ContractError::Unauthorized(burner)));

        let mut owner_ctx = ctx.with_sender(owner());
        token.set_burner(&owner_ctx, burner).unwrap();
        assert_eq!(token.burn(&mut owner_ctx), Err(ContractError::Unauthorized(owner())));
    }

    #[test]
    fn burn_runs_once_after_start() {
        let mut token = token();
        let burner = Address::repeat_byte(0xbb);
        let mut balances = Balances::new();
        let mut logs = Vec::new();
        let mut ctx = CallContext::new(owner(), U256::ZERO, START, &mut balances, &mut logs);
        token.set_burner(&ctx, burner).unwrap();

        let mut ctx = ctx.with_sender(burner);
        assert_eq!(token.burn(&mut ctx), Ok(U256::ZERO));
        assert!(!token.burned());

        token.set_current(START + 1);
        let burned = token.burn(&mut ctx).unwrap();
        assert_eq!(burned, TOKEN_INITIAL_SUPPLY - TOKEN_RETAINED_SUPPLY);
        assert_eq!(token.balance_of(&owner()), TOKEN_RETAINED_SUPPLY);
        assert_eq!(token.total_supply(), TOKEN_RETAINED_SUPPLY);
        assert!(token.burned());

        assert_eq!(token.burn(&mut ctx), Ok(U256::ZERO));
        assert_eq!(logs.len(), 1);
        let event = Burned::decode_log_data(&logs[0].data).unwrap();
        assert_eq!(event.amount, burned);
    }

    #[test]
    fn answers_view_calls() {
        let token = token();
        let input = balanceOfCall { owner: owner() }.abi_encode();
        let out = token.call(&input).unwrap();
        assert_eq!(U256::from_be_slice(&out), TOKEN_INITIAL_SUPPLY);

        let out = token.call(&startTimeCall {}.abi_encode()).unwrap();
        assert_eq!(U256::from_be_slice(&out), U256::from(START));

        assert!(matches!(token.call(&[0x01]), Err(ContractError::InvalidInput(_))));
        assert_eq!(
            token.call(&[0xde, 0xad, 0xbe, 0xef]),
            Err(ContractError::UnknownSelector([0xde, 0xad, 0xbe, 0xef].into()))
        );
    }
}
