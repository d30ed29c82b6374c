//! JSON-RPC error types following Ethereum error code conventions.

use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

/// JSON-RPC error codes following Ethereum conventions.
pub mod codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Server error (reserved range: -32000 to -32099).
    pub const SERVER_ERROR: i32 = -32000;
    /// Resource not found.
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    /// Method not supported.
    pub const METHOD_NOT_SUPPORTED: i32 = -32004;
    /// Request limit exceeded.
    pub const LIMIT_EXCEEDED: i32 = -32005;
    /// Execution error (revert, out of gas, etc.).
    pub const EXECUTION_ERROR: i32 = -32015;
}

/// Errors raised while talking to, or serving as, an Ethereum node.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Block not found.
    #[error("block not found: {0}")]
    BlockNotFound(u64),

    /// Invalid block number.
    #[error("invalid block number: {0}")]
    InvalidBlockNumber(String),

    /// Invalid parameters.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The query matched more results than the node returns at once.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Method not implemented.
    #[error("method not implemented")]
    NotImplemented,

    /// The node answered with a JSON-RPC error object.
    #[error("node error {code}: {message}")]
    Node {
        /// JSON-RPC error code.
        code: i32,
        /// Error message from the node.
        message: String,
    },

    /// HTTP transport failure, including timeouts.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node's answer did not have the expected shape.
    #[error("invalid response to {method}: {reason}")]
    InvalidResponse {
        /// Method that was called.
        method: &'static str,
        /// What was wrong with the response.
        reason: String,
    },
}

impl From<RpcError> for ErrorObjectOwned {
    fn from(err: RpcError) -> Self {
        let code = match &err {
            RpcError::BlockNotFound(_) => codes::RESOURCE_NOT_FOUND,
            RpcError::InvalidBlockNumber(_) | RpcError::InvalidParams(_) => codes::INVALID_PARAMS,
            RpcError::ExecutionFailed(_) => codes::EXECUTION_ERROR,
            RpcError::LimitExceeded(_) => codes::LIMIT_EXCEEDED,
            RpcError::NotImplemented => codes::METHOD_NOT_SUPPORTED,
            RpcError::Node { code, message } => {
                return Self::owned(*code, message.clone(), None::<()>);
            }
            RpcError::Internal(_) | RpcError::Transport(_) | RpcError::InvalidResponse { .. } => {
                codes::INTERNAL_ERROR
            }
        };
        Self::owned(code, err.to_string(), None::<()>)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(RpcError::BlockNotFound(7), codes::RESOURCE_NOT_FOUND, "block not found: 7")]
    #[case(RpcError::InvalidParams("bad".into()), codes::INVALID_PARAMS, "invalid params: bad")]
    #[case(RpcError::ExecutionFailed("revert".into()), codes::EXECUTION_ERROR, "execution failed: revert")]
    #[case(RpcError::NotImplemented, codes::METHOD_NOT_SUPPORTED, "method not implemented")]
    fn test_error_object_codes(
        #[case] err: RpcError,
        #[case] code: i32,
        #[case] message: &str,
    ) {
        let obj = ErrorObjectOwned::from(err);
        assert_eq!(obj.code(), code);
        assert_eq!(obj.message(), message);
    }

    #[test]
    fn test_node_error_keeps_code_and_message() {
        let err = RpcError::Node { code: -32005, message: "query returned more than 10000 results".into() };
        assert_eq!(err.to_string(), "node error -32005: query returned more than 10000 results");

        let obj = ErrorObjectOwned::from(err);
        assert_eq!(obj.code(), -32005);
        assert_eq!(obj.message(), "query returned more than 10000 results");
    }

    #[test]
    fn test_invalid_response_display() {
        let err = RpcError::InvalidResponse { method: "eth_call", reason: "short".into() };
        assert_eq!(err.to_string(), "invalid response to eth_call: short");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RpcError>();
    }
}
