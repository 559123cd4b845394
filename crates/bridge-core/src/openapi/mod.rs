//! OpenAPI 3.x / Swagger 2.0 loading.
//!
//! Accepts a single JSON-encoded document and enumerates its operations.
//! The loader never fails on unfamiliar constructs within an operation —
//! only on a document that isn't recognisable as OpenAPI/Swagger at all.

use bridge_types::{BridgeError, BridgeResult};
use serde_json::Value;

/// The closed set of HTTP methods the loader looks for under each path,
/// in the order operations are returned.
const METHOD_ORDER: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "get" => Self::Get,
            "put" => Self::Put,
            "post" => Self::Post,
            "delete" => Self::Delete,
            "options" => Self::Options,
            "head" => Self::Head,
            "patch" => Self::Patch,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
        }
    }

    pub fn as_lower(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
}

impl ParameterLocation {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenApiParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    /// Raw JSON-Schema-ish fragment (OpenAPI `schema` or, for Swagger 2.0
    /// inline-typed parameters, the parameter object itself).
    pub schema: Value,
}

#[derive(Debug, Clone)]
pub struct RequestBody {
    pub required: bool,
    pub description: Option<String>,
    /// `(content_type, schema)` for whichever media type was selected.
    pub content: Option<(String, Value)>,
}

#[derive(Debug, Clone)]
pub struct OpenApiOperation {
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<OpenApiParameter>,
    pub request_body: Option<RequestBody>,
    pub tags: Vec<String>,
}

/// Parse an inline OpenAPI 3.x or Swagger 2.0 document and enumerate its
/// operations. Rejects empty input and documents lacking a recognisable
/// version marker or a `paths` object; everything past that point degrades
/// gracefully rather than failing: unknown constructs degrade to
/// permissive schemas instead of aborting synthesis.
pub fn load(document: &str) -> BridgeResult<Vec<OpenApiOperation>> {
    if document.trim().is_empty() {
        return Err(BridgeError::OpenApi("api_specification is empty".to_string()));
    }

    let doc: Value = serde_json::from_str(document)
        .map_err(|e| BridgeError::OpenApi(format!("invalid JSON: {e}")))?;

    let is_openapi = doc.get("openapi").and_then(Value::as_str).is_some();
    let is_swagger = doc.get("swagger").and_then(Value::as_str).is_some();
    if !is_openapi && !is_swagger {
        return Err(BridgeError::OpenApi(
            "document has neither an \"openapi\" nor a \"swagger\" version marker".to_string(),
        ));
    }

    let Value::Object(paths) = doc.get("paths").cloned().unwrap_or(Value::Null) else {
        return Err(BridgeError::OpenApi(
            "document has no \"paths\" object".to_string(),
        ));
    };

    let mut operations = Vec::new();
    for (path, item) in paths.iter() {
        let Value::Object(item) = item else { continue };
        for method_key in METHOD_ORDER {
            let Some(op) = item.get(method_key) else { continue };
            let Value::Object(op) = op else { continue };
            let Some(method) = HttpMethod::from_key(method_key) else { continue };

            operations.push(parse_operation(path, method, op, is_swagger));
        }
    }

    Ok(operations)
}

fn parse_operation(
    path: &str,
    method: HttpMethod,
    op: &serde_json::Map<String, Value>,
    is_swagger: bool,
) -> OpenApiOperation {
    let operation_id = op.get("operationId").and_then(Value::as_str).map(str::to_string);
    let summary = op.get("summary").and_then(Value::as_str).map(str::to_string);
    let description = op.get("description").and_then(Value::as_str).map(str::to_string);
    let tags = op
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let parameters = op
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| params.iter().filter_map(parse_parameter).collect())
        .unwrap_or_default();

    let request_body = if is_swagger {
        swagger_body_parameter(op)
    } else {
        op.get("requestBody").and_then(parse_request_body)
    };

    OpenApiOperation {
        path: path.to_string(),
        method,
        operation_id,
        summary,
        description,
        parameters,
        request_body,
        tags,
    }
}

fn parse_parameter(raw: &Value) -> Option<OpenApiParameter> {
    let name = raw.get("name")?.as_str()?.to_string();
    let location = ParameterLocation::from_str(raw.get("in")?.as_str()?)?;
    let required = raw.get("required").and_then(Value::as_bool).unwrap_or(false);

    // OpenAPI 3.x carries a nested `schema`; Swagger 2.0 inline-types the
    // parameter itself (`type`, `format`, etc. live on the parameter
    // object). Both are routed through the same schema converter, so when
    // there's no nested `schema` we pass the parameter object through
    // verbatim.
    let schema = raw.get("schema").cloned().unwrap_or_else(|| raw.clone());

    Some(OpenApiParameter {
        name,
        location,
        required,
        schema,
    })
}

const PREFERRED_CONTENT_TYPES: [&str; 3] = ["application/json", "application/vnd.api+json", "text/json"];

fn parse_request_body(raw: &Value) -> Option<RequestBody> {
    let Value::Object(raw) = raw else { return None };
    let required = raw.get("required").and_then(Value::as_bool).unwrap_or(false);
    let description = raw.get("description").and_then(Value::as_str).map(str::to_string);

    let Value::Object(content_map) = raw.get("content").cloned().unwrap_or(Value::Null) else {
        return Some(RequestBody {
            required,
            description,
            content: None,
        });
    };

    let selected = PREFERRED_CONTENT_TYPES
        .iter()
        .find_map(|ct| content_map.get(*ct).map(|media| (ct.to_string(), media)))
        .or_else(|| {
            content_map
                .iter()
                .find(|(_, media)| media.get("schema").is_some())
                .map(|(ct, media)| (ct.clone(), media))
        });

    let content = selected.and_then(|(content_type, media)| {
        media
            .get("schema")
            .cloned()
            .map(|schema| (content_type, schema))
    });

    Some(RequestBody {
        required,
        description,
        content,
    })
}

/// Swagger 2.0 has no `requestBody`; a `body`-located parameter plays that
/// role, carrying its own `schema`.
fn swagger_body_parameter(op: &serde_json::Map<String, Value>) -> Option<RequestBody> {
    let params = op.get("parameters")?.as_array()?;
    let body_param = params
        .iter()
        .find(|p| p.get("in").and_then(Value::as_str) == Some("body"))?;

    let required = body_param.get("required").and_then(Value::as_bool).unwrap_or(false);
    let description = body_param.get("description").and_then(Value::as_str).map(str::to_string);
    let schema = body_param.get("schema").cloned();

    Some(RequestBody {
        required,
        description,
        content: schema.map(|s| ("application/json".to_string(), s)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_document() {
        assert!(load("").is_err());
        assert!(load("   ").is_err());
    }

    #[test]
    fn rejects_document_without_version_marker() {
        let doc = json!({"paths": {}}).to_string();
        let err = load(&doc).unwrap_err();
        assert!(matches!(err, BridgeError::OpenApi(_)));
    }

    #[test]
    fn rejects_document_without_paths() {
        let doc = json!({"openapi": "3.0.0"}).to_string();
        assert!(load(&doc).is_err());
    }

    #[test]
    fn enumerates_operations_in_method_order() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/status": {
                    "post": {"summary": "Create"},
                    "get": {"summary": "Get Kong status"},
                }
            }
        })
        .to_string();

        let ops = load(&doc).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].method, HttpMethod::Get);
        assert_eq!(ops[1].method, HttpMethod::Post);
    }

    #[test]
    fn parses_path_and_query_parameters() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/plugins/{id}": {
                    "get": {
                        "operationId": "getPlugin",
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                            {"name": "verbose", "in": "query", "required": false, "schema": {"type": "boolean"}},
                        ]
                    }
                }
            }
        })
        .to_string();

        let ops = load(&doc).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].parameters.len(), 2);
        assert_eq!(ops[0].parameters[0].location, ParameterLocation::Path);
        assert!(ops[0].parameters[0].required);
        assert_eq!(ops[0].parameters[1].location, ParameterLocation::Query);
    }

    #[test]
    fn prefers_application_json_request_body() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/widgets": {
                    "post": {
                        "requestBody": {
                            "required": true,
                            "content": {
                                "text/xml": {"schema": {"type": "string"}},
                                "application/json": {"schema": {"type": "object"}},
                            }
                        }
                    }
                }
            }
        })
        .to_string();

        let ops = load(&doc).unwrap();
        let body = ops[0].request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.content.as_ref().unwrap().0, "application/json");
    }

    #[test]
    fn falls_back_to_first_content_type_that_has_a_schema() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/widgets": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/xml": {},
                                "application/zzz+json": {"schema": {"type": "object"}},
                            }
                        }
                    }
                }
            }
        })
        .to_string();

        let ops = load(&doc).unwrap();
        let body = ops[0].request_body.as_ref().unwrap();
        let (content_type, schema) = body.content.as_ref().unwrap();
        assert_eq!(content_type, "application/zzz+json");
        assert_eq!(*schema, json!({"type": "object"}));
    }

    #[test]
    fn swagger_body_parameter_becomes_request_body() {
        let doc = json!({
            "swagger": "2.0",
            "paths": {
                "/widgets": {
                    "post": {
                        "parameters": [
                            {"name": "body", "in": "body", "required": true, "schema": {"type": "object"}},
                        ]
                    }
                }
            }
        })
        .to_string();

        let ops = load(&doc).unwrap();
        let body = ops[0].request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.content.as_ref().unwrap().0, "application/json");
    }

    #[test]
    fn ignores_unknown_method_keys() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/x": {
                    "parameters": [{"name": "shared", "in": "query", "schema": {"type": "string"}}],
                    "get": {}
                }
            }
        })
        .to_string();
        let ops = load(&doc).unwrap();
        assert_eq!(ops.len(), 1);
    }
}
