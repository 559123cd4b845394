//! Error types and conversions shared across the bridge crates.

use thiserror::Error;

/// The bridge's error taxonomy. Every crate boundary converts its own
/// internal error into one of these kinds before it crosses into a caller
/// that doesn't share its vocabulary; the JSON-RPC engine maps each kind to
/// a wire error code via `rpc_code`.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    #[error("tool registry error: {0}")]
    Registry(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("tool not found or access denied")]
    ToolMissingOrForbidden,

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// JSON-RPC 2.0 error code this error kind maps to (spec §4.7, §7).
    pub fn rpc_code(&self) -> i64 {
        match self {
            BridgeError::AuthFailed(_) | BridgeError::ToolMissingOrForbidden => -32001,
            BridgeError::Upstream(_) => -32003,
            BridgeError::InvalidParams(_) => -32602,
            BridgeError::Config(_)
            | BridgeError::OpenApi(_)
            | BridgeError::Registry(_)
            | BridgeError::Internal(_)
            | BridgeError::Io(_)
            | BridgeError::Serialization(_) => -32603,
        }
    }

    /// HTTP status this error kind should be reported with at the transport edge.
    pub fn http_status(&self) -> u16 {
        match self {
            BridgeError::AuthFailed(_) => 401,
            BridgeError::ToolMissingOrForbidden => 404,
            BridgeError::Upstream(_) => 500,
            BridgeError::InvalidParams(_) => 400,
            _ => 500,
        }
    }
}

impl From<BridgeError> for String {
    fn from(err: BridgeError) -> String {
        err.to_string()
    }
}
