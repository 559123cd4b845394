//! OpenAPI operation → MCP tool synthesis (spec §4.3).

use crate::openapi::{HttpMethod, OpenApiOperation, ParameterLocation};
use crate::registry::ToolRecord;
use crate::schema;
use bridge_config::{AccessControl, AccessRequirement, RouteToolConfig};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn non_alnum_underscore() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap())
}

fn non_name_char() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").unwrap())
}

fn repeated_underscores() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").unwrap())
}

fn repeated_hyphens() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Step 2 of name generation: reduce a path template to an identifier-safe
/// fragment (spec §4.3).
fn simplify_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let braces_stripped: String = trimmed
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect();
    let slashes_to_underscore = braces_stripped.replace('/', "_");
    let collapsed_non_word = non_alnum_underscore().replace_all(&slashes_to_underscore, "_");
    let collapsed_runs = repeated_underscores().replace_all(&collapsed_non_word, "_");
    let result = collapsed_runs.trim_matches('_').to_string();

    if result.is_empty() {
        "root".to_string()
    } else {
        result
    }
}

/// Tool names must stay within this bound (spec §8, testable property 2).
const MAX_NAME_LEN: usize = 128;

/// Full deterministic tool-name generation (spec §4.3, testable property 1 & 2).
pub fn tool_name(prefix: &str, method: HttpMethod, path: &str) -> String {
    let simplified_path = simplify_path(path);
    let composed = format!("{prefix}_{}_{simplified_path}", method.as_lower());
    let lowered = composed.to_lowercase();
    let sanitized = non_name_char().replace_all(&lowered, "_");
    let underscores_collapsed = repeated_underscores().replace_all(&sanitized, "_");
    let hyphens_collapsed = repeated_hyphens().replace_all(&underscores_collapsed, "-");
    let trimmed = hyphens_collapsed.trim_matches(|c| c == '_' || c == '-');
    clamp_name(trimmed)
}

/// Truncate a name to `MAX_NAME_LEN`, preferring to cut at a separator so
/// the result doesn't end mid-word.
fn clamp_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name.to_string();
    }

    let window = &name[..MAX_NAME_LEN];
    let cut = window.rfind(['_', '-']).unwrap_or(MAX_NAME_LEN);
    window[..cut].trim_matches(|c| c == '_' || c == '-').to_string()
}

const VERB_TABLE: &[(&str, &str)] = &[
    ("GET", "Retrieve"),
    ("POST", "Create"),
    ("PUT", "Update"),
    ("PATCH", "Partially update"),
    ("DELETE", "Delete"),
    ("HEAD", "Get headers for"),
    ("OPTIONS", "Get options for"),
];

fn verb_for(method: HttpMethod) -> &'static str {
    VERB_TABLE
        .iter()
        .find(|(m, _)| *m == method.as_str())
        .map(|(_, verb)| *verb)
        .unwrap_or("Execute <METHOD> on")
}

/// Description fallback chain (spec §4.3).
fn tool_description(op: &OpenApiOperation) -> String {
    if let Some(summary) = &op.summary {
        if !summary.is_empty() {
            return summary.clone();
        }
    }
    if let Some(description) = &op.description {
        if !description.is_empty() {
            return description.clone();
        }
    }

    let path_with_by = op.path.trim_start_matches('/').replace('{', "by ").replace('}', "");
    format!("{} {}", verb_for(op.method), path_with_by)
}

/// Build the `inputSchema` object for an operation (spec §4.3).
fn input_schema(op: &OpenApiOperation) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &op.parameters {
        properties.insert(param.name.clone(), schema::convert_parameter(param));
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    if let Some(body) = &op.request_body {
        if let Some(body_schema) = schema::convert_request_body(body) {
            properties.insert("body".to_string(), body_schema);
            if body.required {
                required.push(Value::String("body".to_string()));
            }
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), Value::Array(required));
    Value::Object(schema)
}

/// Resolve the access requirements for one operation (spec §4.3): start
/// from the route defaults, then let a matching `per_operation_requirements`
/// entry override the whole list.
fn resolve_access_requirements(
    access_control: Option<&AccessControl>,
    operation_id: Option<&str>,
) -> Vec<AccessRequirement> {
    let Some(access_control) = access_control else {
        return Vec::new();
    };

    if let Some(operation_id) = operation_id {
        if let Some(matching) = access_control
            .per_operation_requirements
            .iter()
            .find(|r| r.operation_id.as_deref() == Some(operation_id))
        {
            return vec![matching.clone()];
        }
    }

    access_control.default_requirements.clone()
}

/// Synthesise a `ToolRecord` for a single operation within a route.
pub fn synthesize(route: &RouteToolConfig, op: &OpenApiOperation) -> ToolRecord {
    let prefix = route.tool_prefix.as_deref().unwrap_or(&route.route_name);
    let name = tool_name(prefix, op.method, &op.path);
    let description = tool_description(op);
    let access_requirements = resolve_access_requirements(route.access_control.as_ref(), op.operation_id.as_deref());

    ToolRecord {
        name,
        description,
        input_schema: input_schema(op),
        http_method: op.method,
        endpoint_path: op.path.clone(),
        route_id: route.route_id.clone(),
        route_name: route.route_name.clone(),
        route_base_path: route.upstream_base_path.clone(),
        operation_id: op.operation_id.clone(),
        access_requirements,
    }
}

/// Synthesise tool records for every operation parsed out of a route's
/// OpenAPI document. Parse failures are the caller's concern (they're
/// fatal for the *route*, not the process — spec §7); this function only
/// handles operations that parsed successfully.
pub fn synthesize_all(route: &RouteToolConfig, operations: &[OpenApiOperation]) -> Vec<ToolRecord> {
    operations.iter().map(|op| synthesize(route, op)).collect()
}
