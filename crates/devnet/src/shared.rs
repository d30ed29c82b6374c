//! A test chain shared with async readers.

use std::sync::Arc;

use alloy_primitives::{Bytes, U64};
use async_trait::async_trait;
use crowdsale_rpc::{
    BlockNumberOrTag, CallRequest, NodeClient, RpcBlock, RpcError, RpcLog, RpcLogFilter,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    chain::TestChain,
    contracts::ContractSet,
    error::ChainError,
    filter::LogFilter,
    types::{IndexedBlock, IndexedLog},
};

/// Cloneable handle to a [`TestChain`] that also serves as a [`NodeClient`].
///
/// Locks are only held for the duration of a synchronous chain access, never
/// across an await point.
#[derive(Debug)]
pub struct SharedChain<S> {
    inner: Arc<RwLock<TestChain<S>>>,
}

impl<S> Clone for SharedChain<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S: ContractSet> SharedChain<S> {
    /// Wraps `chain`.
    pub fn new(chain: TestChain<S>) -> Self {
        Self { inner: Arc::new(RwLock::new(chain)) }
    }

    /// Shared access to the chain.
    pub fn read(&self) -> RwLockReadGuard<'_, TestChain<S>> {
        self.inner.read()
    }

    /// Exclusive access to the chain.
    pub fn write(&self) -> RwLockWriteGuard<'_, TestChain<S>> {
        self.inner.write()
    }
}

impl<S: ContractSet> From<TestChain<S>> for SharedChain<S> {
    fn from(chain: TestChain<S>) -> Self {
        Self::new(chain)
    }
}

#[async_trait]
impl<S: ContractSet> NodeClient for SharedChain<S> {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(self.read().config().chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(self.read().block_number())
    }

    async fn call(
        &self,
        request: CallRequest,
        _block: Option<BlockNumberOrTag>,
    ) -> Result<Bytes, RpcError> {
        let to = request.to.ok_or_else(|| RpcError::InvalidParams("missing `to`".into()))?;
        let input = request.input_data();
        self.read().call(to, &input).map_err(chain_error_to_rpc)
    }

    async fn logs(&self, filter: RpcLogFilter) -> Result<Vec<RpcLog>, RpcError> {
        let chain = self.read();
        let head = chain.block_number();

        let mut log_filter = LogFilter::new();
        if let Some(from) = filter.from_block {
            log_filter = log_filter.from_block(from.resolve(head));
        }
        if let Some(to) = filter.to_block {
            log_filter = log_filter.to_block(to.resolve(head));
        }
        if let Some(address) = filter.address {
            log_filter = log_filter.address(address.into_vec());
        }
        for (i, topic) in filter.topics.unwrap_or_default().into_iter().enumerate() {
            if let Some(topic) = topic {
                log_filter = log_filter.topic(i, topic.into_vec());
            }
        }

        let logs = chain.logs(&log_filter).map_err(chain_error_to_rpc)?;
        Ok(logs.into_iter().map(indexed_log_to_rpc).collect())
    }

    async fn block_by_number(
        &self,
        block: BlockNumberOrTag,
    ) -> Result<Option<RpcBlock>, RpcError> {
        let chain = self.read();
        let number = block.resolve(chain.block_number());
        Ok(chain.block(number).map(indexed_block_to_rpc))
    }
}

fn chain_error_to_rpc(err: ChainError) -> RpcError {
    match err {
        ChainError::InvalidBlockRange { .. } => RpcError::InvalidParams(err.to_string()),
        ChainError::Call { .. } | ChainError::Reverted(_) => {
            RpcError::ExecutionFailed(err.to_string())
        }
        ChainError::GasTooLow { .. } | ChainError::CannotPay(_) => {
            RpcError::InvalidParams(err.to_string())
        }
        ChainError::InvalidLog { .. } => RpcError::Internal(err.to_string()),
    }
}

fn indexed_block_to_rpc(block: &IndexedBlock) -> RpcBlock {
    RpcBlock {
        hash: block.hash,
        parent_hash: block.parent_hash,
        number: U64::from(block.number),
        timestamp: U64::from(block.timestamp),
        gas_limit: U64::from(block.gas_limit),
        gas_used: U64::from(block.gas_used),
        miner: block.miner,
        transactions: block.transaction_hashes.clone(),
    }
}

fn indexed_log_to_rpc(log: IndexedLog) -> RpcLog {
    RpcLog {
        address: log.address,
        topics: log.topics,
        data: log.data,
        block_number: U64::from(log.block_number),
        transaction_hash: log.transaction_hash,
        transaction_index: U64::from(log.transaction_index),
        block_hash: log.block_hash,
        log_index: U64::from(log.log_index),
        removed: false,
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256, address};
    use crowdsale_rpc::{BlockTag, TopicFilter};

    use super::*;
    use crate::{ChainConfig, TxRequest};

    const ALICE: Address = address!("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");

    fn shared() -> SharedChain<()> {
        let alloc = [(ALICE, U256::from(1u64) << 80)];
        let mut chain = TestChain::new(ChainConfig::default(), (), alloc);
        chain
            .send_transaction(TxRequest::transfer(ALICE, Address::ZERO, U256::from(1u64)))
            .unwrap();
        SharedChain::new(chain)
    }

    #[tokio::test]
    async fn serves_head_and_blocks() {
        let node = shared();
        assert_eq!(node.chain_id().await.unwrap(), 1337);
        assert_eq!(node.block_number().await.unwrap(), 1);

        let latest = node.block_by_number(BlockNumberOrTag::Tag(BlockTag::Latest)).await.unwrap();
        let latest = latest.unwrap();
        assert_eq!(latest.number, U64::from(1));
        assert_eq!(latest.transactions.len(), 1);

        let genesis = node.block_by_number(BlockNumberOrTag::from(0u64)).await.unwrap().unwrap();
        assert_eq!(latest.parent_hash, genesis.hash);
        assert!(node.block_by_number(BlockNumberOrTag::from(9u64)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn call_requires_target() {
        let node = shared();
        let err = node.call(CallRequest::default(), None).await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidParams(_)));

        let err = node.call(CallRequest::new(ALICE, Bytes::new()), None).await.unwrap_err();
        assert!(matches!(err, RpcError::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn rejects_inverted_log_range() {
        let node = shared();
        let filter = RpcLogFilter::new().from_block(5).to_block(1);
        let err = node.logs(filter).await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidParams(_)));

        let mut filter = RpcLogFilter::new();
        filter.topics = Some(vec![None, Some(TopicFilter::Single(Default::default()))]);
        assert!(node.logs(filter).await.unwrap().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let node = shared();
        let other = node.clone();
        other
            .write()
            .send_transaction(TxRequest::transfer(ALICE, Address::ZERO, U256::from(1u64)))
            .unwrap();
        assert_eq!(node.read().block_number(), 2);
    }
}
