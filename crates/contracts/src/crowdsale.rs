//! The Edgeless crowdsale.

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use crowdsale_primitives::format_ether;
use tracing::{debug, info};

use crate::{
    CallContext, Clock, ContractError, CrowdsaleParams, EdgelessToken,
    abi::{
        FundTransfer, GoalReached, amountRaisedCall, balanceOfCall, crowdsaleClosedCall,
        fundingGoalReachedCall, getPriceCall, tokensSoldCall,
    },
    token::selector,
};

/// Tiered-price token sale.
///
/// Payments are forwarded to the multisig wallet as they arrive and tokens
/// are drawn from the beneficiary's balance through the token allowance.
/// After the last deadline, [`check_goal_reached`](Self::check_goal_reached)
/// closes the sale and either burns the unsold supply or opens refunds.
#[derive(Clone, Debug)]
pub struct Crowdsale {
    address: Address,
    params: CrowdsaleParams,
    amount_raised: U256,
    tokens_sold: U256,
    balances: HashMap<Address, U256>,
    funding_goal_reached: bool,
    crowdsale_closed: bool,
    clock: Clock,
}

impl Crowdsale {
    /// Deploys the sale at `address`.
    pub fn new(address: Address, params: CrowdsaleParams) -> Self {
        Self {
            address,
            params,
            amount_raised: U256::ZERO,
            tokens_sold: U256::ZERO,
            balances: HashMap::new(),
            funding_goal_reached: false,
            crowdsale_closed: false,
            clock: Clock::default(),
        }
    }

    /// Address the sale is deployed at.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Schedule and goals.
    pub const fn params(&self) -> &CrowdsaleParams {
        &self.params
    }

    /// Wei raised so far.
    pub const fn amount_raised(&self) -> U256 {
        self.amount_raised
    }

    /// Tokens sold so far.
    pub const fn tokens_sold(&self) -> U256 {
        self.tokens_sold
    }

    /// Wei contributed by `backer` and not yet refunded.
    pub fn balance_of(&self, backer: &Address) -> U256 {
        self.balances.get(backer).copied().unwrap_or_default()
    }

    /// Whether the sale closed having met its funding goal.
    pub const fn funding_goal_reached(&self) -> bool {
        self.funding_goal_reached
    }

    /// Whether the sale is closed.
    pub const fn crowdsale_closed(&self) -> bool {
        self.crowdsale_closed
    }

    /// Pins the sale's clock.
    pub const fn set_current(&mut self, timestamp: u64) {
        self.clock.set_current(timestamp);
    }

    /// Token price in wei at the given block timestamp.
    pub fn get_price(&self, block_timestamp: u64) -> U256 {
        self.params.price_at(self.clock.now(block_timestamp))
    }

    /// Handles a plain payment into the sale.
    ///
    /// Payments from the multisig wallet top up the refund pool. Anything
    /// else buys tokens for the sender.
    pub fn receive(
        &mut self,
        token: &mut EdgelessToken,
        ctx: &mut CallContext<'_>,
    ) -> Result<(), ContractError> {
        if ctx.sender == self.params.multisig {
            debug!(value = %ctx.value, "refund pool topped up");
            return Ok(());
        }
        let receiver = ctx.sender;
        self.invest(token, ctx, receiver)
    }

    /// Buys tokens for `receiver` with the attached value.
    ///
    /// The value must already be credited to the sale's account. Rounding
    /// change stays in the payment: the whole value is forwarded.
    pub fn invest(
        &mut self,
        token: &mut EdgelessToken,
        ctx: &mut CallContext<'_>,
        receiver: Address,
    ) -> Result<(), ContractError> {
        let now = self.clock.now(ctx.timestamp);
        let amount = ctx.value;
        let price = self.params.price_at(now);
        if price > amount {
            return Err(ContractError::ValueBelowPrice { value: amount, price });
        }
        let tokens = amount / price;

        if self.crowdsale_closed {
            return Err(ContractError::SaleClosed);
        }
        if now < self.params.start {
            return Err(ContractError::NotStarted { now, start: self.params.start });
        }
        let sold = self.tokens_sold.checked_add(tokens).ok_or(ContractError::Overflow)?;
        if sold > self.params.max_goal {
            return Err(ContractError::MaxGoalExceeded {
                requested: tokens,
                available: self.params.max_goal.saturating_sub(self.tokens_sold),
            });
        }

        let backer = self.balance_of(&receiver).checked_add(amount).ok_or(ContractError::Overflow)?;
        let raised = self.amount_raised.checked_add(amount).ok_or(ContractError::Overflow)?;
        let multisig = self.params.multisig;
        let have = ctx.balance_of(&self.address);
        if have < amount {
            return Err(ContractError::InsufficientFunds { account: self.address, need: amount, have });
        }
        if multisig != self.address && ctx.balance_of(&multisig).checked_add(amount).is_none() {
            return Err(ContractError::Overflow);
        }

        // Nothing below may fail once the tokens have moved.
        let beneficiary = self.params.beneficiary;
        token.transfer_from(&mut ctx.with_sender(self.address), beneficiary, receiver, tokens)?;
        ctx.balances().transfer(self.address, multisig, amount)?;

        self.balances.insert(receiver, backer);
        self.amount_raised = raised;
        self.tokens_sold = sold;

        debug!(
            %receiver,
            ether = %format_ether(amount),
            %tokens,
            raised = %format_ether(self.amount_raised),
            "tokens sold"
        );
        ctx.emit(
            self.address,
            &FundTransfer {
                backer: receiver,
                amount,
                isContribution: true,
                amountRaised: self.amount_raised,
            },
        );
        Ok(())
    }

    /// Closes the sale once the last deadline has passed.
    ///
    /// If the funding goal was met, burns the unsold supply and emits
    /// `GoalReached`. Before the deadline, or once closed, does nothing.
    pub fn check_goal_reached(
        &mut self,
        token: &mut EdgelessToken,
        ctx: &mut CallContext<'_>,
    ) -> Result<(), ContractError> {
        let now = self.clock.now(ctx.timestamp);
        if now < self.params.end() || self.crowdsale_closed {
            return Ok(());
        }

        if self.tokens_sold >= self.params.funding_goal {
            self.funding_goal_reached = true;
            token.burn(&mut ctx.with_sender(self.address))?;
            ctx.emit(
                self.address,
                &GoalReached {
                    beneficiary: self.params.beneficiary,
                    amountRaised: self.amount_raised,
                },
            );
        }
        self.crowdsale_closed = true;

        info!(
            sold = %self.tokens_sold,
            raised = %format_ether(self.amount_raised),
            goal_reached = self.funding_goal_reached,
            "crowdsale closed"
        );
        Ok(())
    }

    /// Refunds the caller's contribution after a failed sale.
    ///
    /// Pays nothing before the last deadline, when the caller has no
    /// contribution, or while the sale holds too little to cover it.
    pub fn safe_withdrawal(&mut self, ctx: &mut CallContext<'_>) -> Result<(), ContractError> {
        let now = self.clock.now(ctx.timestamp);
        if now < self.params.end() {
            return Ok(());
        }
        if self.funding_goal_reached {
            return Err(ContractError::GoalReached);
        }

        let backer = ctx.sender;
        let amount = self.balance_of(&backer);
        if amount.is_zero() || ctx.balance_of(&self.address) < amount {
            return Ok(());
        }

        self.balances.insert(backer, U256::ZERO);
        ctx.balances().transfer(self.address, backer, amount)?;

        debug!(%backer, %amount, "refunded");
        ctx.emit(
            self.address,
            &FundTransfer {
                backer,
                amount,
                isContribution: false,
                amountRaised: self.amount_raised,
            },
        );
        Ok(())
    }

    /// Answers a read-only ABI call at the given block timestamp.
    pub fn call(&self, input: &[u8], block_timestamp: u64) -> Result<Bytes, ContractError> {
        let out = match selector(input)? {
            amountRaisedCall::SELECTOR => self.amount_raised.abi_encode(),
            tokensSoldCall::SELECTOR => self.tokens_sold.abi_encode(),
            getPriceCall::SELECTOR => self.get_price(block_timestamp).abi_encode(),
            fundingGoalReachedCall::SELECTOR => self.funding_goal_reached.abi_encode(),
            crowdsaleClosedCall::SELECTOR => self.crowdsale_closed.abi_encode(),
            balanceOfCall::SELECTOR => {
                let call = balanceOfCall::abi_decode(input)
                    .map_err(|e| ContractError::InvalidInput(e.to_string()))?;
                self.balance_of(&call.owner).abi_encode()
            }
            other => return Err(ContractError::UnknownSelector(other.into())),
        };
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Log, address};
    use alloy_sol_types::SolEvent;
    use crowdsale_primitives::ether;

    use super::*;
    use crate::{Balances, EDGELESS_DEADLINES, EDGELESS_START, abi::Transfer};

    const SALE: Address = address!("c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5");
    const TOKEN: Address = address!("7070707070707070707070707070707070707070");
    const BENEFICIARY: Address = address!("bebebebebebebebebebebebebebebebebebebebe");
    const MULTISIG: Address = address!("5555555555555555555555555555555555555555");
    const BACKER: Address = address!("cccccccccccccccccccccccccccccccccccccccc");

    struct Fixture {
        token: EdgelessToken,
        sale: Crowdsale,
        balances: Balances,
        logs: Vec<Log>,
    }

    impl Fixture {
        fn new() -> Self {
            let params = CrowdsaleParams::edgeless(BENEFICIARY, MULTISIG);
            let mut token = EdgelessToken::new(TOKEN, BENEFICIARY, params.end());
            let mut balances = Balances::new();
            let mut logs = Vec::new();

            let mut ctx = CallContext::new(BENEFICIARY, U256::ZERO, 0, &mut balances, &mut logs);
            token.approve(&mut ctx, SALE, params.max_goal);
            token.set_burner(&ctx, SALE).unwrap();
            logs.clear();

            Self { token, sale: Crowdsale::new(SALE, params), balances, logs }
        }

        /// Pays `value` from the backer into the sale and invests it.
        fn pay(&mut self, value: U256, timestamp: u64) -> Result<(), ContractError> {
            self.balances.credit(SALE, value)?;
            let mut ctx =
                CallContext::new(BACKER, value, timestamp, &mut self.balances, &mut self.logs);
            self.sale.receive(&mut self.token, &mut ctx)
        }

        fn check_goal(&mut self, timestamp: u64) -> Result<(), ContractError> {
            let mut ctx =
                CallContext::new(BACKER, U256::ZERO, timestamp, &mut self.balances, &mut self.logs);
            self.sale.check_goal_reached(&mut self.token, &mut ctx)
        }

        fn withdraw(&mut self, timestamp: u64) -> Result<(), ContractError> {
            let mut ctx =
                CallContext::new(BACKER, U256::ZERO, timestamp, &mut self.balances, &mut self.logs);
            self.sale.safe_withdrawal(&mut ctx)
        }
    }

    #[test]
    fn twenty_ether_buys_first_tier_tokens() {
        let mut f = Fixture::new();
        f.pay(ether(20), EDGELESS_START).unwrap();

        assert_eq!(f.token.balance_of(&BACKER), U256::from(24_000u64));
        assert_eq!(f.sale.balance_of(&BACKER), ether(20));
        assert_eq!(f.sale.amount_raised(), ether(20));
        assert_eq!(f.balances.balance_of(&MULTISIG), ether(20));
        assert_eq!(f.balances.balance_of(&SALE), U256::ZERO);

        assert_eq!(f.logs.len(), 2);
        assert_eq!(f.logs[0].address, TOKEN);
        assert_eq!(f.logs[0].topics()[0], Transfer::SIGNATURE_HASH);
        let event = FundTransfer::decode_log_data(&f.logs[1].data).unwrap();
        assert_eq!(event.backer, BACKER);
        assert!(event.isContribution);
        assert_eq!(event.amountRaised, ether(20));
    }

    #[test]
    fn failed_token_transfer_leaves_sale_untouched() {
        let mut f = Fixture::new();
        let mut ctx = CallContext::new(BENEFICIARY, U256::ZERO, 0, &mut f.balances, &mut f.logs);
        f.token.approve(&mut ctx, SALE, U256::ZERO);
        f.logs.clear();

        let err = f.pay(ether(20), EDGELESS_START).unwrap_err();

        assert!(matches!(
            err,
            ContractError::InsufficientAllowance { need, have, .. }
                if need == U256::from(24_000u64) && have.is_zero()
        ));
        assert_eq!(f.sale.amount_raised(), U256::ZERO);
        assert_eq!(f.sale.tokens_sold(), U256::ZERO);
        assert_eq!(f.sale.balance_of(&BACKER), U256::ZERO);
        assert_eq!(f.balances.balance_of(&MULTISIG), U256::ZERO);
        assert_eq!(f.balances.balance_of(&SALE), ether(20));
        assert_eq!(f.token.balance_of(&BACKER), U256::ZERO);
        assert!(f.logs.is_empty());
    }

    #[test]
    fn unfunded_payment_moves_no_tokens() {
        let mut f = Fixture::new();
        let mut ctx =
            CallContext::new(BACKER, ether(20), EDGELESS_START, &mut f.balances, &mut f.logs);

        let err = f.sale.receive(&mut f.token, &mut ctx).unwrap_err();

        assert!(matches!(err, ContractError::InsufficientFunds { account, .. } if account == SALE));
        assert_eq!(f.token.balance_of(&BACKER), U256::ZERO);
        assert_eq!(f.token.allowance(&BENEFICIARY, &SALE), f.sale.params().max_goal);
        assert_eq!(f.sale.amount_raised(), U256::ZERO);
        assert!(f.logs.is_empty());
    }

    #[test]
    fn rejects_payment_below_price() {
        let mut f = Fixture::new();
        let err = f.pay(U256::from(1u64), EDGELESS_START).unwrap_err();
        assert!(matches!(err, ContractError::ValueBelowPrice { .. }));
    }

    #[test]
    fn rejects_early_payment() {
        let mut f = Fixture::new();
        let err = f.pay(ether(20), EDGELESS_START - 1).unwrap_err();
        assert_eq!(err, ContractError::NotStarted { now: EDGELESS_START - 1, start: EDGELESS_START });
    }

    #[test]
    fn rejects_purchase_beyond_max_goal() {
        let mut f = Fixture::new();
        let price = f.sale.get_price(EDGELESS_START);
        f.pay(price * f.sale.params().max_goal, EDGELESS_START).unwrap();
        assert_eq!(f.sale.tokens_sold(), f.sale.params().max_goal);

        let err = f.pay(price, EDGELESS_START).unwrap_err();
        assert_eq!(
            err,
            ContractError::MaxGoalExceeded { requested: U256::from(1u64), available: U256::ZERO }
        );
    }

    #[test]
    fn multisig_payment_tops_up_refund_pool() {
        let mut f = Fixture::new();
        f.balances.credit(SALE, ether(5)).unwrap();
        let mut ctx =
            CallContext::new(MULTISIG, ether(5), EDGELESS_START, &mut f.balances, &mut f.logs);
        f.sale.receive(&mut f.token, &mut ctx).unwrap();

        assert_eq!(f.balances.balance_of(&SALE), ether(5));
        assert_eq!(f.sale.amount_raised(), U256::ZERO);
        assert!(f.logs.is_empty());
    }

    #[test]
    fn goal_check_waits_for_end() {
        let mut f = Fixture::new();
        let end = EDGELESS_DEADLINES[3];

        f.check_goal(end - 1).unwrap();
        assert!(!f.sale.crowdsale_closed());

        f.check_goal(end).unwrap();
        assert!(f.sale.crowdsale_closed());
        assert!(!f.sale.funding_goal_reached());

        let err = f.pay(ether(20), end).unwrap_err();
        assert_eq!(err, ContractError::SaleClosed);
    }

    #[test]
    fn reaching_goal_burns_surplus() {
        let mut f = Fixture::new();
        let price = f.sale.get_price(EDGELESS_START);
        f.pay(price * f.sale.params().funding_goal, EDGELESS_START).unwrap();

        let after = EDGELESS_DEADLINES[3] + 1;
        f.logs.clear();
        f.check_goal(after).unwrap();

        assert!(f.sale.funding_goal_reached());
        assert!(f.token.burned());
        assert_eq!(f.token.total_supply(), U256::from(110_000_000u64));
        assert_eq!(f.logs.len(), 2);
        assert_eq!(f.logs[1].topics()[0], GoalReached::SIGNATURE_HASH);

        let err = f.withdraw(after).unwrap_err();
        assert_eq!(err, ContractError::GoalReached);
    }

    #[test]
    fn failed_sale_refunds_backer() {
        let mut f = Fixture::new();
        f.pay(ether(20), EDGELESS_START).unwrap();
        let after = EDGELESS_DEADLINES[3] + 1;
        f.check_goal(after).unwrap();

        // Nothing to pay out until the multisig returns the funds.
        f.withdraw(after).unwrap();
        assert_eq!(f.sale.balance_of(&BACKER), ether(20));

        f.balances.transfer(MULTISIG, SALE, ether(20)).unwrap();
        f.logs.clear();
        f.withdraw(after).unwrap();

        assert_eq!(f.sale.balance_of(&BACKER), U256::ZERO);
        assert_eq!(f.balances.balance_of(&BACKER), ether(20));
        let event = FundTransfer::decode_log_data(&f.logs[0].data).unwrap();
        assert!(!event.isContribution);
        assert_eq!(event.amount, ether(20));
    }

    #[test]
    fn answers_view_calls() {
        let mut f = Fixture::new();
        f.pay(ether(20), EDGELESS_START).unwrap();

        let out = f.sale.call(&amountRaisedCall {}.abi_encode(), EDGELESS_START).unwrap();
        assert_eq!(U256::from_be_slice(&out), ether(20));

        let out = f.sale.call(&getPriceCall {}.abi_encode(), EDGELESS_DEADLINES[0]).unwrap();
        assert_eq!(U256::from_be_slice(&out), f.sale.params().prices[1]);

        f.sale.set_current(EDGELESS_DEADLINES[3] + 1);
        let out = f.sale.call(&getPriceCall {}.abi_encode(), 0).unwrap();
        assert_eq!(U256::from_be_slice(&out), f.sale.params().prices[3]);
    }
}
