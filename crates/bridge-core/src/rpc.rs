//! JSON-RPC 2.0 envelope parsing and encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const AUTH_OR_TOOL_ERROR: i64 = -32001;
pub const TOOL_EXECUTION_ERROR: i64 = -32003;

/// A parsed and envelope-validated JSON-RPC request.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

impl RpcRequest {
    /// A request with no `id` is a notification: it never produces a
    /// response body.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_detail(code: i64, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(serde_json::json!({"detail": detail.into()})),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Raw envelope shape used only to validate the parts serde can't validate
/// via types alone (e.g. that `jsonrpc` is exactly `"2.0"`).
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    jsonrpc: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<Value>,
    #[serde(default)]
    params: Option<Value>,
}

pub enum ParseOutcome {
    Request(RpcRequest),
    /// The envelope was well-formed JSON-RPC but invalid in some way; the
    /// caller should respond with this error using whatever `id` could be
    /// salvaged (or `null`).
    Invalid { id: Value, error: RpcError },
}

/// Parse a raw HTTP body into a validated JSON-RPC request, or an error
/// outcome carrying the right code and (if recoverable) `id`.
pub fn parse(body: &str) -> ParseOutcome {
    let raw: RawEnvelope = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            return ParseOutcome::Invalid {
                id: Value::Null,
                error: RpcError::new(PARSE_ERROR, "Parse error"),
            }
        }
    };

    let id = raw.id.clone().unwrap_or(Value::Null);

    if raw.jsonrpc.as_ref().and_then(Value::as_str) != Some("2.0") {
        return ParseOutcome::Invalid {
            id,
            error: RpcError::new(INVALID_REQUEST, "Invalid Request: jsonrpc must be \"2.0\""),
        };
    }

    let Some(Value::String(method)) = raw.method else {
        return ParseOutcome::Invalid {
            id,
            error: RpcError::new(INVALID_REQUEST, "Invalid Request: missing method"),
        };
    };

    if let Some(id) = &raw.id {
        if !matches!(id, Value::String(_) | Value::Number(_) | Value::Null) {
            return ParseOutcome::Invalid {
                id: Value::Null,
                error: RpcError::new(INVALID_REQUEST, "Invalid Request: id must be a string, number, or null"),
            };
        }
    }

    if let Some(params) = &raw.params {
        if !matches!(params, Value::Object(_) | Value::Array(_)) {
            return ParseOutcome::Invalid {
                id,
                error: RpcError::new(INVALID_REQUEST, "Invalid Request: params must be an object or array"),
            };
        }
    }

    ParseOutcome::Request(RpcRequest {
        id: raw.id,
        method,
        params: raw.params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_on_invalid_json() {
        match parse("not json") {
            ParseOutcome::Invalid { error, .. } => assert_eq!(error.code, PARSE_ERROR),
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn invalid_request_on_missing_jsonrpc() {
        match parse(r#"{"id":1,"method":"tools/list"}"#) {
            ParseOutcome::Invalid { error, .. } => assert_eq!(error.code, INVALID_REQUEST),
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn invalid_request_on_wrong_jsonrpc_version() {
        match parse(r#"{"jsonrpc":"1.0","id":1,"method":"tools/list"}"#) {
            ParseOutcome::Invalid { error, .. } => assert_eq!(error.code, INVALID_REQUEST),
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn invalid_request_on_missing_method() {
        match parse(r#"{"jsonrpc":"2.0","id":1}"#) {
            ParseOutcome::Invalid { error, .. } => assert_eq!(error.code, INVALID_REQUEST),
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn invalid_request_on_wrong_type_params() {
        match parse(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list","params":"x"}"#) {
            ParseOutcome::Invalid { error, .. } => assert_eq!(error.code, INVALID_REQUEST),
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn notification_has_no_id() {
        match parse(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#) {
            ParseOutcome::Request(req) => assert!(req.is_notification()),
            _ => panic!("expected request"),
        }
    }

    #[test]
    fn valid_request_parses() {
        match parse(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#) {
            ParseOutcome::Request(req) => {
                assert_eq!(req.method, "tools/list");
                assert_eq!(req.id, Some(Value::from(1)));
            }
            _ => panic!("expected request"),
        }
    }

    #[test]
    fn s6_missing_tool_name_detail() {
        let err = RpcError::with_detail(INVALID_PARAMS, "Invalid params", "Missing tool name");
        assert_eq!(err.code, -32602);
        assert_eq!(err.data.unwrap()["detail"], "Missing tool name");
    }
}
