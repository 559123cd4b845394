//! Execution dispatcher: binds MCP call arguments onto the upstream HTTP
//! request for a tool and maps the response back into an MCP `content`
//! envelope.

use crate::openapi::{HttpMethod, ParameterLocation};
use crate::registry::ToolRecord;
use crate::schema;
use bridge_types::{BridgeError, BridgeResult};
use reqwest::Method;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Patch => Method::PATCH,
    }
}

fn stringify_argument(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A request built from a `ToolRecord` + MCP arguments, ready to send.
struct BoundRequest {
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

/// Bind `arguments` onto `tool`'s declared parameters, producing the
/// upstream URL, headers, and (for write methods) a JSON body.
fn bind(tool: &ToolRecord, arguments: &Value) -> BoundRequest {
    let empty = Map::new();
    let args = arguments.as_object().unwrap_or(&empty);
    let properties = tool
        .input_schema
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut path = tool.endpoint_path.clone();
    let mut query_pairs: Vec<(String, String)> = Vec::new();
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut consumed: Vec<String> = Vec::new();

    for (param_name, param_schema) in &properties {
        if param_name == "body" {
            continue;
        }
        let Some(location) = schema::location_of(param_schema) else {
            continue;
        };
        let Some(value) = args.get(param_name) else {
            continue;
        };
        consumed.push(param_name.clone());
        let rendered = stringify_argument(value);

        match location {
            ParameterLocation::Path => {
                let placeholder = format!("{{{param_name}}}");
                let encoded = urlencoding::encode(&rendered);
                path = path.replace(&placeholder, &encoded);
            }
            ParameterLocation::Query => {
                query_pairs.push((param_name.clone(), rendered));
            }
            ParameterLocation::Header => {
                headers.push((param_name.clone(), rendered));
            }
        }
    }

    let mut url = format!("{}{}", tool.route_base_path, path);
    if !query_pairs.is_empty() {
        let query: Vec<String> = query_pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        url.push('?');
        url.push_str(&query.join("&"));
    }

    let body = if matches!(tool.http_method, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
        && properties.contains_key("body")
    {
        Some(build_body(args, &consumed))
    } else {
        None
    };

    BoundRequest { url, headers, body }
}

/// Build the request body: an explicit `arguments.body` wins verbatim;
/// otherwise the subset of arguments not consumed by declared parameters
/// is used.
fn build_body(args: &Map<String, Value>, consumed: &[String]) -> Value {
    if let Some(explicit) = args.get("body") {
        return explicit.clone();
    }

    let mut body = Map::new();
    for (key, value) in args {
        if key != "body" && !consumed.contains(key) {
            body.insert(key.clone(), value.clone());
        }
    }
    Value::Object(body)
}

/// The JSON-RPC `result` of a successful `tools/call` dispatch (spec §4.9
/// step 6, §6).
pub struct DispatchResult {
    pub content: Vec<Value>,
    pub is_error: bool,
}

impl DispatchResult {
    pub fn into_value(self) -> Value {
        let mut result = Map::new();
        result.insert("content".to_string(), Value::Array(self.content));
        if self.is_error {
            result.insert("isError".to_string(), Value::Bool(true));
        }
        Value::Object(result)
    }
}

fn text_content(text: String) -> Value {
    serde_json::json!({"type": "text", "text": text})
}

/// Invoke the upstream HTTP call for `tool` with `arguments` and map the
/// result into an MCP `content` envelope (spec §4.9 steps 4-6).
pub async fn dispatch(client: &reqwest::Client, tool: &ToolRecord, arguments: &Value) -> BridgeResult<DispatchResult> {
    let bound = bind(tool, arguments);
    debug!(tool = %tool.name, url = %bound.url, "dispatching tool call to upstream");

    let mut request = client.request(reqwest_method(tool.http_method), &bound.url).timeout(UPSTREAM_TIMEOUT);

    for (name, value) in &bound.headers {
        request = request.header(name, value);
    }

    if let Some(body) = &bound.body {
        request = request.header("Content-Type", "application/json").json(body);
    }

    let response = request.send().await.map_err(|e| {
        let phase = if e.is_timeout() { "upstream request timed out" } else { "upstream request failed" };
        BridgeError::Upstream(format!("{phase}: {e}"))
    })?;

    let status = response.status();
    let body_text = response.text().await.map_err(|e| BridgeError::Upstream(format!("failed to read upstream response body: {e}")))?;

    if status.is_success() {
        let rendered = match serde_json::from_str::<Value>(&body_text) {
            Ok(json) => serde_json::to_string(&json).unwrap_or(body_text),
            Err(_) => body_text,
        };
        Ok(DispatchResult {
            content: vec![text_content(rendered)],
            is_error: false,
        })
    } else {
        warn!(tool = %tool.name, status = %status, "upstream returned an error status");
        Ok(DispatchResult {
            content: vec![text_content(format!("HTTP {status} Error: {body_text}"))],
            is_error: true,
        })
    }
}
