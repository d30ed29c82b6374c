//! JSON-RPC server.

use std::net::SocketAddr;

use jsonrpsee::server::{Server, ServerConfig, ServerHandle};
use tracing::info;

use crate::{
    client::NodeClient,
    eth::{EthApiImpl, EthApiServer},
};

/// Default cap on concurrent connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 100;

/// Error type for RPC server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind server.
    #[error("failed to bind server: {0}")]
    Bind(std::io::Error),
    /// Failed to register RPC methods.
    #[error("failed to register RPC methods: {0}")]
    RegisterMethod(#[from] jsonrpsee::core::RegisterMethodError),
}

/// Serves the `eth` API of a [`NodeClient`] backend over HTTP and WebSocket.
#[derive(Debug)]
pub struct JsonRpcServer<B> {
    addr: SocketAddr,
    backend: B,
    max_connections: u32,
}

impl<B: NodeClient + Clone + 'static> JsonRpcServer<B> {
    /// Create a new JSON-RPC server. Port 0 picks a free port.
    pub const fn new(addr: SocketAddr, backend: B) -> Self {
        Self { addr, backend, max_connections: DEFAULT_MAX_CONNECTIONS }
    }

    /// Set maximum concurrent connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Binds and starts serving in the background.
    pub async fn start(self) -> Result<RpcServerHandle, ServerError> {
        let server = Server::builder()
            .set_config(ServerConfig::builder().max_connections(self.max_connections).build())
            .build(self.addr)
            .await
            .map_err(ServerError::Bind)?;
        let local_addr = server.local_addr().map_err(ServerError::Bind)?;

        let mut module = jsonrpsee::RpcModule::new(());
        module.merge(EthApiImpl::new(self.backend).into_rpc())?;

        info!(addr = %local_addr, "Starting JSON-RPC server");

        Ok(RpcServerHandle { local_addr, handle: server.start(module) })
    }
}

/// Handle for a running [`JsonRpcServer`].
#[derive(Debug, Clone)]
pub struct RpcServerHandle {
    local_addr: SocketAddr,
    handle: ServerHandle,
}

impl RpcServerHandle {
    /// Address the server is bound to.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// HTTP URL of the server.
    pub fn http_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Signals the server to stop.
    pub fn stop(&self) {
        // Already stopped is fine.
        let _ = self.handle.stop();
    }

    /// Waits until the server has stopped.
    pub async fn stopped(self) {
        self.handle.stopped().await;
    }
}
