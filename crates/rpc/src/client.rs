//! Node access used by the exporter.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use alloy_primitives::{Bytes, U64};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::trace;

use crate::{
    error::RpcError,
    types::{BlockNumberOrTag, CallRequest, RpcBlock, RpcLog, RpcLogFilter},
};

/// Read-only view of an Ethereum node.
///
/// Implemented over HTTP by [`HttpClient`] and in-process by the devnet, so
/// the exporter and the JSON-RPC server work against either.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Chain identifier.
    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// Number of the latest block.
    async fn block_number(&self) -> Result<u64, RpcError>;

    /// Executes a read-only contract call.
    async fn call(
        &self,
        request: CallRequest,
        block: Option<BlockNumberOrTag>,
    ) -> Result<Bytes, RpcError>;

    /// Returns the logs matching `filter`.
    async fn logs(&self, filter: RpcLogFilter) -> Result<Vec<RpcLog>, RpcError>;

    /// Returns a block header, or `None` if the block does not exist.
    async fn block_by_number(&self, block: BlockNumberOrTag)
    -> Result<Option<RpcBlock>, RpcError>;
}

#[async_trait]
impl<T: NodeClient + ?Sized> NodeClient for Arc<T> {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        (**self).chain_id().await
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        (**self).block_number().await
    }

    async fn call(
        &self,
        request: CallRequest,
        block: Option<BlockNumberOrTag>,
    ) -> Result<Bytes, RpcError> {
        (**self).call(request, block).await
    }

    async fn logs(&self, filter: RpcLogFilter) -> Result<Vec<RpcLog>, RpcError> {
        (**self).logs(filter).await
    }

    async fn block_by_number(
        &self,
        block: BlockNumberOrTag,
    ) -> Result<Option<RpcBlock>, RpcError> {
        (**self).block_by_number(block).await
    }
}

/// JSON-RPC 2.0 client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    code: i32,
    message: String,
}

impl HttpClient {
    /// Creates a client for the node at `url`.
    ///
    /// `timeout` bounds every request; log queries over a long history can
    /// be slow, so it should be generous.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into(), next_id: Arc::new(AtomicU64::new(1)) })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<P, R>(&self, method: &'static str, params: P) -> Result<R, RpcError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        trace!(method, id, "rpc request");

        let response: Response =
            self.client.post(&self.url).json(&body).send().await?.error_for_status()?.json().await?;

        if let Some(error) = response.error {
            return Err(RpcError::Node { code: error.code, message: error.message });
        }
        serde_json::from_value(response.result)
            .map_err(|e| RpcError::InvalidResponse { method, reason: e.to_string() })
    }
}

#[async_trait]
impl NodeClient for HttpClient {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let number: U64 = self.request("eth_blockNumber", json!([])).await?;
        Ok(number.to::<u64>())
    }

    async fn call(
        &self,
        request: CallRequest,
        block: Option<BlockNumberOrTag>,
    ) -> Result<Bytes, RpcError> {
        self.request("eth_call", (request, block.unwrap_or_default())).await
    }

    async fn logs(&self, filter: RpcLogFilter) -> Result<Vec<RpcLog>, RpcError> {
        self.request("eth_getLogs", [filter]).await
    }

    async fn block_by_number(
        &self,
        block: BlockNumberOrTag,
    ) -> Result<Option<RpcBlock>, RpcError> {
        self.request("eth_getBlockByNumber", (block, false)).await
    }
}
