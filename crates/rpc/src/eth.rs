//! Ethereum JSON-RPC API implementation.

use alloy_primitives::{Bytes, U64};
use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use tracing::debug;

use crate::{
    client::NodeClient,
    types::{BlockNumberOrTag, CallRequest, RpcBlock, RpcLog, RpcLogFilter},
};

/// Read-only subset of the `eth` namespace.
#[rpc(server, namespace = "eth")]
pub trait EthApi {
    /// Returns the chain ID.
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<U64>;

    /// Returns the current block number.
    #[method(name = "blockNumber")]
    async fn block_number(&self) -> RpcResult<U64>;

    /// Executes a call without creating a transaction.
    #[method(name = "call")]
    async fn call(&self, request: CallRequest, block: Option<BlockNumberOrTag>) -> RpcResult<Bytes>;

    /// Returns logs matching a filter.
    #[method(name = "getLogs")]
    async fn get_logs(&self, filter: RpcLogFilter) -> RpcResult<Vec<RpcLog>>;

    /// Returns a block by number.
    #[method(name = "getBlockByNumber")]
    async fn get_block_by_number(
        &self,
        block: BlockNumberOrTag,
        full_transactions: bool,
    ) -> RpcResult<Option<RpcBlock>>;
}

/// `eth` API served from any [`NodeClient`] backend.
#[derive(Debug, Clone)]
pub struct EthApiImpl<B> {
    backend: B,
}

impl<B: NodeClient + 'static> EthApiImpl<B> {
    /// Create a new Ethereum API implementation over `backend`.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[jsonrpsee::core::async_trait]
impl<B: NodeClient + 'static> EthApiServer for EthApiImpl<B> {
    async fn chain_id(&self) -> RpcResult<U64> {
        Ok(U64::from(self.backend.chain_id().await?))
    }

    async fn block_number(&self) -> RpcResult<U64> {
        Ok(U64::from(self.backend.block_number().await?))
    }

    async fn call(&self, request: CallRequest, block: Option<BlockNumberOrTag>) -> RpcResult<Bytes> {
        self.backend.call(request, block).await.map_err(Into::into)
    }

    async fn get_logs(&self, filter: RpcLogFilter) -> RpcResult<Vec<RpcLog>> {
        let logs = self.backend.logs(filter).await?;
        debug!(count = logs.len(), "eth_getLogs");
        Ok(logs)
    }

    async fn get_block_by_number(
        &self,
        block: BlockNumberOrTag,
        _full_transactions: bool,
    ) -> RpcResult<Option<RpcBlock>> {
        self.backend.block_by_number(block).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{RpcError, error::codes};

    /// Backend that knows one block and nothing else.
    #[derive(Debug)]
    struct SingleBlock;

    #[async_trait]
    impl NodeClient for SingleBlock {
        async fn chain_id(&self) -> Result<u64, RpcError> {
            Ok(1337)
        }

        async fn block_number(&self) -> Result<u64, RpcError> {
            Ok(0)
        }

        async fn call(
            &self,
            _request: CallRequest,
            _block: Option<BlockNumberOrTag>,
        ) -> Result<Bytes, RpcError> {
            Err(RpcError::ExecutionFailed("no contracts".into()))
        }

        async fn logs(&self, _filter: RpcLogFilter) -> Result<Vec<RpcLog>, RpcError> {
            Ok(Vec::new())
        }

        async fn block_by_number(
            &self,
            block: BlockNumberOrTag,
        ) -> Result<Option<RpcBlock>, RpcError> {
            Ok((block.resolve(0) == 0).then(RpcBlock::default))
        }
    }

    #[tokio::test]
    async fn eth_chain_id() {
        let api = EthApiImpl::new(SingleBlock);
        let chain_id = EthApiServer::chain_id(&api).await.unwrap();
        assert_eq!(chain_id, U64::from(1337));
    }

    #[tokio::test]
    async fn eth_get_block_by_number() {
        let api = EthApiImpl::new(SingleBlock);
        let genesis = EthApiServer::get_block_by_number(&api, BlockNumberOrTag::from(0u64), false)
            .await
            .unwrap();
        assert!(genesis.is_some());
        let missing = EthApiServer::get_block_by_number(&api, BlockNumberOrTag::from(5u64), false)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn eth_call_maps_backend_error() {
        let api = EthApiImpl::new(SingleBlock);
        let err = EthApiServer::call(&api, CallRequest::default(), None).await.unwrap_err();
        assert_eq!(err.code(), codes::EXECUTION_ERROR);
    }
}
