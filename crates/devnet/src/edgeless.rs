//! The Edgeless sale deployed on a test chain.

use alloy_primitives::{Address, B256, Bytes, U256, address, keccak256};
use crowdsale_contracts::{CallContext, ContractError, Crowdsale, CrowdsaleParams, EdgelessToken};
use crowdsale_primitives::ether;
use tracing::info;

use crate::{
    chain::{TestChain, TxRequest},
    config::ChainConfig,
    contracts::ContractSet,
    error::ChainError,
};

/// Gas limit the contract tests attach to purchases.
pub const PURCHASE_GAS: u64 = 250_000;

/// Wei each named account except the empty one starts with.
pub fn initial_balance() -> U256 {
    ether(1_000_000)
}

/// The token and its crowdsale.
#[derive(Debug, Clone)]
pub struct EdgelessContracts {
    /// The EDG token.
    pub token: EdgelessToken,
    /// The sale.
    pub crowdsale: Crowdsale,
}

impl ContractSet for EdgelessContracts {
    fn contains(&self, address: &Address) -> bool {
        *address == self.token.address() || *address == self.crowdsale.address()
    }

    fn receive(&mut self, to: Address, ctx: &mut CallContext<'_>) -> Result<(), ContractError> {
        if to == self.crowdsale.address() {
            self.crowdsale.receive(&mut self.token, ctx)
        } else if to == self.token.address() {
            Err(ContractError::NotPayable(to))
        } else {
            Err(ContractError::UnknownContract(to))
        }
    }

    fn call(&self, to: Address, input: &[u8], timestamp: u64) -> Result<Bytes, ContractError> {
        if to == self.crowdsale.address() {
            self.crowdsale.call(input, timestamp)
        } else if to == self.token.address() {
            self.token.call(input)
        } else {
            Err(ContractError::UnknownContract(to))
        }
    }
}

/// Named accounts taking part in the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accounts {
    /// Deploys the contracts and moves the contract clocks.
    pub deployer: Address,
    /// Token owner whose supply is sold.
    pub beneficiary: Address,
    /// Wallet receiving the raised funds.
    pub multisig: Address,
    /// A backer.
    pub customer: Address,
    /// A second backer.
    pub customer_2: Address,
    /// Starts with nothing.
    pub empty: Address,
    /// Spender in allowance tests.
    pub allowed_party: Address,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            deployer: address!("82a978b3f5962a5b0957d9ee9eef472ee55b42f1"),
            beneficiary: address!("7d577a597b2742b498cb5cf0c26cdcd726d39e6e"),
            multisig: address!("dceceaf3fc5c0a63d195d69b1a90011b7b19650d"),
            customer: address!("598443f1880ef585b21f1d7585bd0577402861e5"),
            customer_2: address!("13cbb8d99c6c4e0f2728c7d72606e78a29c4e224"),
            empty: address!("77db2bebba79db42a978f896968f4afce746ea1f"),
            allowed_party: address!("1d7b0bc3a9b31cfa55db0a4ddc8e6ff0d4a3b2ba"),
        }
    }
}

impl Accounts {
    fn funded(&self) -> impl Iterator<Item = (Address, U256)> {
        [
            self.deployer,
            self.beneficiary,
            self.multisig,
            self.customer,
            self.customer_2,
            self.allowed_party,
        ]
        .into_iter()
        .map(|account| (account, initial_balance()))
    }
}

/// Address of a contract deployed by `deployer` with its `nonce`-th creation.
pub fn contract_address(deployer: Address, nonce: u64) -> Address {
    let mut buf = [0u8; 28];
    buf[..20].copy_from_slice(deployer.as_slice());
    buf[20..].copy_from_slice(&nonce.to_be_bytes());
    Address::from_word(keccak256(buf))
}

/// A test chain with the Edgeless sale deployed and wired up.
///
/// At genesis the sale has not opened. The beneficiary has approved the
/// crowdsale for the whole sale allocation and made it the token's burner.
/// The contract clocks follow block time until one of the presets pins them.
#[derive(Debug, Clone)]
pub struct Deployment {
    chain: TestChain<EdgelessContracts>,
    accounts: Accounts,
}

impl Deployment {
    /// Deploys with the default accounts.
    pub fn deploy(config: ChainConfig) -> Result<Self, ChainError> {
        Self::deploy_with(config, Accounts::default())
    }

    /// Deploys with the given accounts.
    pub fn deploy_with(config: ChainConfig, accounts: Accounts) -> Result<Self, ChainError> {
        let params = CrowdsaleParams::edgeless(accounts.beneficiary, accounts.multisig);
        let token = EdgelessToken::new(
            contract_address(accounts.deployer, 0),
            accounts.beneficiary,
            params.end(),
        );
        let crowdsale = Crowdsale::new(contract_address(accounts.deployer, 1), params);
        let (token_address, crowdsale_address) = (token.address(), crowdsale.address());
        let max_goal = crowdsale.params().max_goal;

        let contracts = EdgelessContracts { token, crowdsale };
        let chain = TestChain::new(config, contracts, accounts.funded());
        let mut deployment = Self { chain, accounts };

        deployment.chain.transact(accounts.beneficiary, token_address, |c, ctx| {
            c.token.approve(ctx, crowdsale_address, max_goal);
            c.token.set_burner(ctx, crowdsale_address)
        })?;

        info!(token = %token_address, crowdsale = %crowdsale_address, "deployed Edgeless sale");
        Ok(deployment)
    }

    /// Underlying chain.
    pub const fn chain(&self) -> &TestChain<EdgelessContracts> {
        &self.chain
    }

    /// Underlying chain, mutably.
    pub const fn chain_mut(&mut self) -> &mut TestChain<EdgelessContracts> {
        &mut self.chain
    }

    /// Consumes the deployment, returning the chain.
    pub fn into_chain(self) -> TestChain<EdgelessContracts> {
        self.chain
    }

    /// Named accounts.
    pub const fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    /// Current token state.
    pub const fn token(&self) -> &EdgelessToken {
        &self.chain.contracts().token
    }

    /// Current crowdsale state.
    pub const fn crowdsale(&self) -> &Crowdsale {
        &self.chain.contracts().crowdsale
    }

    /// Token address.
    pub const fn token_address(&self) -> Address {
        self.token().address()
    }

    /// Crowdsale address.
    pub const fn crowdsale_address(&self) -> Address {
        self.crowdsale().address()
    }

    /// Pins the crowdsale clock.
    pub fn set_crowdsale_time(&mut self, timestamp: u64) -> Result<(), ChainError> {
        let to = self.crowdsale_address();
        self.chain.transact(self.accounts.deployer, to, |c, _| {
            c.crowdsale.set_current(timestamp);
            Ok(())
        })
    }

    /// Pins the token clock.
    pub fn set_token_time(&mut self, timestamp: u64) -> Result<(), ChainError> {
        let to = self.token_address();
        self.chain.transact(self.accounts.deployer, to, |c, _| {
            c.token.set_current(timestamp);
            Ok(())
        })
    }

    /// One second before the sale opens.
    pub fn early(&mut self) -> Result<(), ChainError> {
        self.set_crowdsale_time(self.crowdsale().params().start - 1)
    }

    /// The opening second of the sale.
    pub fn open(&mut self) -> Result<(), ChainError> {
        self.set_crowdsale_time(self.crowdsale().params().start)
    }

    /// One second after the last deadline.
    pub fn finished(&mut self) -> Result<(), ChainError> {
        self.set_crowdsale_time(self.crowdsale().params().end() + 1)
    }

    /// Token transfers unlocked.
    pub fn token_released(&mut self) -> Result<(), ChainError> {
        self.set_token_time(self.token().start_time() + 1)
    }

    /// Sends `value` wei from `from` to the crowdsale.
    pub fn buy(&mut self, from: Address, value: U256) -> Result<B256, ChainError> {
        let to = self.crowdsale_address();
        self.chain.send_transaction(TxRequest::transfer(from, to, value).with_gas(PURCHASE_GAS))
    }

    /// Calls `checkGoalReached` as `from`.
    pub fn check_goal_reached(&mut self, from: Address) -> Result<(), ChainError> {
        let to = self.crowdsale_address();
        self.chain.transact(from, to, |c, ctx| c.crowdsale.check_goal_reached(&mut c.token, ctx))
    }

    /// Calls `safeWithdrawal` as `from`.
    pub fn safe_withdrawal(&mut self, from: Address) -> Result<(), ChainError> {
        let to = self.crowdsale_address();
        self.chain.transact(from, to, |c, ctx| c.crowdsale.safe_withdrawal(ctx))
    }

    /// Token `transfer` as `from`.
    pub fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<(), ChainError> {
        let token = self.token_address();
        self.chain.transact(from, token, |c, ctx| c.token.transfer(ctx, to, value))
    }

    /// Token `approve` as `owner`.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<(), ChainError> {
        let token = self.token_address();
        self.chain.transact(owner, token, |c, ctx| {
            c.token.approve(ctx, spender, value);
            Ok(())
        })
    }

    /// Token `transferFrom` as `spender`.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), ChainError> {
        let token = self.token_address();
        self.chain.transact(spender, token, |c, ctx| c.token.transfer_from(ctx, from, to, value))
    }
}
