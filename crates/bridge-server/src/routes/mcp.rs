//! The single MCP endpoint: `GET` for capability discovery, `POST` for
//! JSON-RPC dispatch (spec §4.8, §6).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use bridge_core::registry::Lookup;
use bridge_core::rpc::{self, ParseOutcome, RpcError, RpcResponse};
use bridge_oauth::ClaimSet;
use bridge_types::BridgeError;

use crate::error;
use crate::state::AppState;

/// `GET` on the MCP endpoint: an unauthenticated capability advertisement
/// (spec §4.8). Never requires a bearer token.
pub async fn handle_get(State(state): State<AppState>) -> Response {
    let config = state.config();
    (
        StatusCode::OK,
        Json(json!({
            "capabilities": {"tools": {}},
            "serverInfo": {"name": config.server_name, "version": config.server_version},
        })),
    )
        .into_response()
}

/// `POST` on the MCP endpoint: parse the JSON-RPC envelope, authenticate
/// if OAuth is enabled, then dispatch by method.
pub async fn handle_post(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let request = match rpc::parse(&body) {
        ParseOutcome::Request(req) => req,
        ParseOutcome::Invalid { id, error } => {
            return (StatusCode::OK, Json(RpcResponse::error(id, error))).into_response();
        }
    };

    // Notifications never get a response body, whatever the method
    // (spec §4.7). `notifications/initialized` is the only one the spec
    // names, but the rule itself is method-agnostic.
    if request.is_notification() {
        return StatusCode::ACCEPTED.into_response();
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let config = state.config();

    // `None` means "no identity to filter by" — OAuth disabled, so every
    // tool is unrestricted (spec §4.5 step 1), not merely claimless.
    let claims = if config.oauth.enabled {
        let token = extract_bearer(&headers);
        match state.validator().validate(token.as_deref(), &config.oauth).await {
            Ok(claims) => Some(claims),
            Err(err) => {
                let www_authenticate = www_authenticate_value(&headers);
                return error::error_response(id, &err, Some(&www_authenticate));
            }
        }
    } else {
        None
    };

    match request.method.as_str() {
        "initialize" => ok(id, handle_initialize(&config)),
        "tools/list" => ok(id, handle_tools_list(&state, claims.as_ref())),
        "tools/call" => handle_tools_call(&state, claims.as_ref(), id, request.params).await,
        _ => (
            StatusCode::OK,
            Json(RpcResponse::error(id, RpcError::new(rpc::METHOD_NOT_FOUND, "Method not found"))),
        )
            .into_response(),
    }
}

fn ok(id: Value, result: Value) -> Response {
    (StatusCode::OK, Json(RpcResponse::success(id, result))).into_response()
}

fn handle_initialize(config: &bridge_config::ServerConfig) -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {"tools": {"listChanged": false}},
        "serverInfo": {"name": config.server_name, "version": config.server_version},
    })
}

fn handle_tools_list(state: &AppState, claims: Option<&ClaimSet>) -> Value {
    let registry = state.registry();
    let tools: Vec<_> = registry.list(claims).into_iter().map(|t| t.list_projection()).collect();
    json!({ "tools": tools })
}

async fn handle_tools_call(state: &AppState, claims: Option<&ClaimSet>, id: Value, params: Option<Value>) -> Response {
    let Some(name) = params.as_ref().and_then(|p| p.get("name")).and_then(Value::as_str) else {
        let err = BridgeError::InvalidParams("Missing tool name".to_string());
        return error::error_response(id, &err, None);
    };

    let arguments = params
        .as_ref()
        .and_then(|p| p.get("arguments"))
        .filter(|v| v.is_object())
        .cloned()
        .unwrap_or_else(|| json!({}));

    let registry = state.registry();
    let tool = match registry.lookup(name, claims) {
        Lookup::Found(tool) => tool.clone(),
        Lookup::NotFound | Lookup::Forbidden => {
            return error::error_response(id, &BridgeError::ToolMissingOrForbidden, None);
        }
    };

    match bridge_core::dispatch(state.http_client(), &tool, &arguments).await {
        Ok(result) => ok(id, result.into_value()),
        Err(err) => error::error_response(id, &err, None),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.trim().is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Build the `WWW-Authenticate` header value for a 401 (spec §4.8, S4):
/// `Bearer resource_metadata="<scheme>://<host>/.well-known/oauth-protected-resource"`.
fn www_authenticate_value(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("Bearer resource_metadata=\"{scheme}://{host}/.well-known/oauth-protected-resource\"")
}
