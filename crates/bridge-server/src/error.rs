//! Mapping from the core's error taxonomy to HTTP responses (spec §7).
//!
//! `BridgeError` already knows its JSON-RPC code and HTTP status
//! (`bridge_types::errors`); this module only adds the fixed
//! caller-facing message per kind and turns the pair into an axum
//! `Response` carrying a JSON-RPC error envelope.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_types::BridgeError;

use bridge_core::rpc::{RpcError, RpcResponse};

/// The fixed, caller-facing message for an error kind. Never includes the
/// bearer token or decoded claims (spec §4.5, §7).
pub fn message_for(err: &BridgeError) -> &'static str {
    match err {
        BridgeError::AuthFailed(_) => "Authentication failed",
        BridgeError::ToolMissingOrForbidden => "Tool not found or access denied",
        BridgeError::Upstream(_) => "Tool execution failed",
        BridgeError::InvalidParams(_) => "Invalid params",
        _ => "Internal error",
    }
}

/// The `data.detail` carried alongside the fixed message, when the error
/// kind has one worth surfacing.
pub fn detail_for(err: &BridgeError) -> Option<String> {
    match err {
        BridgeError::AuthFailed(detail) => Some(detail.clone()),
        BridgeError::Upstream(detail) => Some(detail.clone()),
        BridgeError::InvalidParams(detail) => Some(detail.clone()),
        _ => None,
    }
}

pub fn rpc_error_for(err: &BridgeError) -> RpcError {
    match detail_for(err) {
        Some(detail) => RpcError::with_detail(err.rpc_code(), message_for(err), detail),
        None => RpcError::new(err.rpc_code(), message_for(err)),
    }
}

/// Render a JSON-RPC error response at the given `id`, with the HTTP
/// status and (for `AuthFailed`) the `WWW-Authenticate` header the spec
/// requires (spec §4.8).
pub fn error_response(
    id: serde_json::Value,
    err: &BridgeError,
    www_authenticate: Option<&str>,
) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = RpcResponse::error(id, rpc_error_for(err));

    let mut response = (status, Json(body)).into_response();
    if let Some(value) = www_authenticate {
        if let Ok(header) = HeaderValue::from_str(value) {
            response.headers_mut().insert(axum::http::header::WWW_AUTHENTICATE, header);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failed_message_never_echoes_detail() {
        let err = BridgeError::AuthFailed("signature mismatch for token abc.def.ghi".to_string());
        assert_eq!(message_for(&err), "Authentication failed");
    }

    #[test]
    fn tool_missing_message_matches_s5() {
        let err = BridgeError::ToolMissingOrForbidden;
        assert_eq!(message_for(&err), "Tool not found or access denied");
    }
}
