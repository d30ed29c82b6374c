//! The test chain.

use std::collections::HashMap;

use alloy_primitives::{Address, B256, Bytes, Log, U256, keccak256};
use alloy_sol_types::SolEvent;
use crowdsale_contracts::{Balances, CallContext, ContractError};
use tracing::{debug, trace};

use crate::{
    config::ChainConfig,
    contracts::ContractSet,
    error::ChainError,
    filter::LogFilter,
    index::BlockIndex,
    types::{IndexedBlock, IndexedLog, IndexedReceipt, IndexedTransaction},
};

/// A transaction submitted to a [`TestChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Sender.
    pub from: Address,
    /// Recipient account or contract.
    pub to: Address,
    /// Wei sent along.
    pub value: U256,
    /// Gas limit; the block gas limit when unset.
    pub gas: Option<u64>,
    /// Call data, recorded on the transaction.
    pub input: Bytes,
}

impl TxRequest {
    /// A plain payment of `value` wei.
    pub fn transfer(from: Address, to: Address, value: U256) -> Self {
        Self { from, to, value, gas: None, input: Bytes::new() }
    }

    /// A contract call carrying no value.
    pub fn call(from: Address, to: Address) -> Self {
        Self::transfer(from, to, U256::ZERO)
    }

    /// Set the gas limit.
    #[must_use]
    pub const fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Set the call data.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }
}

/// Single-node chain that mines one block per successful transaction.
#[derive(Debug, Clone)]
pub struct TestChain<S> {
    config: ChainConfig,
    balances: Balances,
    contracts: S,
    nonces: HashMap<Address, u64>,
    index: BlockIndex,
    head: IndexedBlock,
}

impl<S: ContractSet> TestChain<S> {
    /// Creates a chain with `contracts` deployed and `alloc` funded at genesis.
    pub fn new(
        config: ChainConfig,
        contracts: S,
        alloc: impl IntoIterator<Item = (Address, U256)>,
    ) -> Self {
        let genesis = IndexedBlock {
            hash: block_hash(B256::ZERO, 0, config.genesis_timestamp, &[]),
            number: 0,
            parent_hash: B256::ZERO,
            timestamp: config.genesis_timestamp,
            gas_limit: config.block_gas_limit,
            gas_used: 0,
            miner: config.coinbase,
            transaction_hashes: Vec::new(),
        };
        let mut index = BlockIndex::new();
        index.insert_block(genesis.clone(), Vec::new(), Vec::new());

        Self {
            config,
            balances: alloc.into_iter().collect(),
            contracts,
            nonces: HashMap::new(),
            index,
            head: genesis,
        }
    }

    /// Chain parameters.
    pub const fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Deployed contracts.
    pub const fn contracts(&self) -> &S {
        &self.contracts
    }

    /// Wei held by `account`.
    pub fn balance(&self, account: &Address) -> U256 {
        self.balances.balance_of(account)
    }

    /// Transactions sent by `account`.
    pub fn nonce(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or_default()
    }

    /// Number of the latest block.
    pub const fn block_number(&self) -> u64 {
        self.head.number
    }

    /// Timestamp of the latest block.
    pub const fn timestamp(&self) -> u64 {
        self.head.timestamp
    }

    /// Latest block.
    pub const fn head(&self) -> &IndexedBlock {
        &self.head
    }

    /// Block by number.
    pub fn block(&self, number: u64) -> Option<&IndexedBlock> {
        self.index.get_block_by_number(number)
    }

    /// Receipt of a mined transaction.
    pub fn receipt(&self, hash: &B256) -> Option<&IndexedReceipt> {
        self.index.get_receipt(hash)
    }

    /// Mined transaction by hash.
    pub fn transaction(&self, hash: &B256) -> Option<&IndexedTransaction> {
        self.index.get_transaction(hash)
    }

    /// Logs matching `filter`, in chain order.
    pub fn logs(&self, filter: &LogFilter) -> Result<Vec<IndexedLog>, ChainError> {
        self.index.get_logs(filter)
    }

    /// Every `E` event emitted by the contract at `address`, oldest first.
    ///
    /// Fails if a log carrying the event's signature does not decode.
    pub fn events<E: SolEvent>(&self, address: Address) -> Result<Vec<E>, ChainError> {
        let filter = LogFilter::new().event(address, E::SIGNATURE_HASH);
        self.index
            .get_logs(&filter)?
            .into_iter()
            .map(|log| {
                E::decode_raw_log(log.topics.iter().copied(), &log.data).map_err(|e| {
                    ChainError::InvalidLog {
                        block: log.block_number,
                        log_index: log.log_index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Evaluates a read-only call against the latest state.
    pub fn call(&self, to: Address, input: &[u8]) -> Result<Bytes, ChainError> {
        self.contracts
            .call(to, input, self.head.timestamp)
            .map_err(|source| ChainError::Call { to, source })
    }

    /// Sends a plain payment, triggering the recipient contract if there is one.
    pub fn send_transaction(&mut self, tx: TxRequest) -> Result<B256, ChainError> {
        let to = tx.to;
        let (hash, ()) = self.execute(tx, |contracts, ctx| {
            if contracts.contains(&to) { contracts.receive(to, ctx) } else { Ok(()) }
        })?;
        Ok(hash)
    }

    /// Runs `f` as a zero-value transaction from `from` to `to`.
    pub fn transact<R, F>(&mut self, from: Address, to: Address, f: F) -> Result<R, ChainError>
    where
        F: FnOnce(&mut S, &mut CallContext<'_>) -> Result<R, ContractError>,
    {
        self.execute(TxRequest::call(from, to), f).map(|(_, output)| output)
    }

    /// Executes a transaction whose effect is `f`.
    ///
    /// The fee and value move first, then `f` runs against copies of the
    /// ledger and contracts. On success the copies become the new state and
    /// a block is mined; on any failure the chain is left untouched.
    pub fn execute<R, F>(&mut self, tx: TxRequest, f: F) -> Result<(B256, R), ChainError>
    where
        F: FnOnce(&mut S, &mut CallContext<'_>) -> Result<R, ContractError>,
    {
        let gas = tx.gas.unwrap_or(self.config.block_gas_limit);
        if gas < self.config.intrinsic_gas {
            return Err(ChainError::GasTooLow { gas, intrinsic: self.config.intrinsic_gas });
        }

        let mut balances = self.balances.clone();
        let mut contracts = self.contracts.clone();
        let fee = U256::from(self.config.tx_fee());
        balances
            .transfer(tx.from, self.config.coinbase, fee)
            .and_then(|()| balances.transfer(tx.from, tx.to, tx.value))
            .map_err(|_| ChainError::CannotPay(tx.from))?;

        let timestamp = self.head.timestamp.saturating_add(self.config.block_time);
        let mut logs = Vec::new();
        let mut ctx = CallContext::new(tx.from, tx.value, timestamp, &mut balances, &mut logs);
        let output = match f(&mut contracts, &mut ctx) {
            Ok(output) => output,
            Err(err) => {
                debug!(from = %tx.from, to = %tx.to, %err, "transaction reverted");
                return Err(err.into());
            }
        };

        self.balances = balances;
        self.contracts = contracts;
        let hash = self.mine(tx, gas, timestamp, logs);
        Ok((hash, output))
    }

    fn mine(&mut self, tx: TxRequest, gas_limit: u64, timestamp: u64, logs: Vec<Log>) -> B256 {
        let nonce = self.nonces.entry(tx.from).or_default();
        let tx_nonce = *nonce;
        *nonce += 1;

        let tx_hash = tx_hash(self.config.chain_id, &tx, tx_nonce);
        let number = self.head.number + 1;
        let hash = block_hash(self.head.hash, number, timestamp, &[tx_hash]);

        let logs: Vec<IndexedLog> = logs
            .into_iter()
            .enumerate()
            .map(|(log_index, log)| {
                let (topics, data) = log.data.split();
                IndexedLog {
                    address: log.address,
                    topics,
                    data,
                    block_number: number,
                    block_hash: hash,
                    transaction_hash: tx_hash,
                    transaction_index: 0,
                    log_index: log_index as u64,
                }
            })
            .collect();
        trace!(number, tx = %tx_hash, logs = logs.len(), "mining block");

        let block = IndexedBlock {
            hash,
            number,
            parent_hash: self.head.hash,
            timestamp,
            gas_limit: self.config.block_gas_limit,
            gas_used: self.config.intrinsic_gas,
            miner: self.config.coinbase,
            transaction_hashes: vec![tx_hash],
        };
        let receipt = IndexedReceipt {
            transaction_hash: tx_hash,
            block_hash: hash,
            block_number: number,
            transaction_index: 0,
            from: tx.from,
            to: tx.to,
            gas_used: self.config.intrinsic_gas,
            logs,
        };
        let transaction = IndexedTransaction {
            hash: tx_hash,
            block_hash: hash,
            block_number: number,
            index: 0,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            gas_limit,
            input: tx.input,
            nonce: tx_nonce,
        };

        self.index.insert_block(block.clone(), vec![transaction], vec![receipt]);
        self.head = block;
        tx_hash
    }
}

fn tx_hash(chain_id: u64, tx: &TxRequest, nonce: u64) -> B256 {
    let mut buf = Vec::with_capacity(8 + 20 + 8 + 20 + 32 + tx.input.len());
    buf.extend_from_slice(&chain_id.to_be_bytes());
    buf.extend_from_slice(tx.from.as_slice());
    buf.extend_from_slice(&nonce.to_be_bytes());
    buf.extend_from_slice(tx.to.as_slice());
    buf.extend_from_slice(&tx.value.to_be_bytes::<32>());
    buf.extend_from_slice(&tx.input);
    keccak256(buf)
}

fn block_hash(parent: B256, number: u64, timestamp: u64, txs: &[B256]) -> B256 {
    let mut buf = Vec::with_capacity(32 + 16 + txs.len() * 32);
    buf.extend_from_slice(parent.as_slice());
    buf.extend_from_slice(&number.to_be_bytes());
    buf.extend_from_slice(&timestamp.to_be_bytes());
    for tx in txs {
        buf.extend_from_slice(tx.as_slice());
    }
    keccak256(buf)
}
