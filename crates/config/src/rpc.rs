//! Node connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default JSON-RPC endpoint of the node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default per-request timeout in seconds.
///
/// Historical log queries over a whole sale can take minutes on a busy node.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Connection settings for the node the exporter reads from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcConfig {
    /// HTTP JSON-RPC endpoint.
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl RpcConfig {
    /// Returns the request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { url: DEFAULT_RPC_URL.to_string(), request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS }
    }
}

fn default_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
