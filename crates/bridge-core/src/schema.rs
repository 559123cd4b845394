//! OpenAPI/Swagger schema → JSON-Schema fragment conversion (spec §4.2).
//!
//! Never fails: unrecognised constructs are dropped rather than rejected,
//! so a tool's `inputSchema` degrades to something permissive instead of
//! blocking synthesis (spec §4.3's "unknown OpenAPI constructs degrade to
//! permissive schemas, never fail synthesis").

use crate::openapi::{OpenApiParameter, ParameterLocation, RequestBody};
use serde_json::{Map, Value};

const STRING_KEYS: [&str; 3] = ["minLength", "maxLength", "pattern"];
const NUMERIC_KEYS: [&str; 5] = ["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum", "multipleOf"];
const ARRAY_KEYS: [&str; 3] = ["minItems", "maxItems", "uniqueItems"];
const COPY_KEYS: [&str; 4] = ["type", "format", "default", "example"];

/// Convert a single OpenAPI/Swagger schema fragment into a JSON-Schema
/// fragment. Recurses into `properties`/`items` so nested object and array
/// constraints are carried along too.
pub fn convert_schema(raw: &Value) -> Value {
    let Value::Object(raw) = raw else {
        return Value::Object(Map::new());
    };

    let mut out = Map::new();

    for key in COPY_KEYS {
        if let Some(v) = raw.get(key) {
            out.insert(key.to_string(), v.clone());
        }
    }
    if let Some(v) = raw.get("description") {
        out.insert("description".to_string(), v.clone());
    }
    if let Some(v) = raw.get("enum") {
        out.insert("enum".to_string(), v.clone());
    }

    for key in STRING_KEYS.iter().chain(NUMERIC_KEYS.iter()).chain(ARRAY_KEYS.iter()) {
        if let Some(v) = raw.get(*key) {
            out.insert((*key).to_string(), v.clone());
        }
    }

    if let Some(items) = raw.get("items") {
        out.insert("items".to_string(), convert_schema(items));
    }

    if let Some(Value::Object(properties)) = raw.get("properties") {
        let mut converted_props = Map::new();
        for (name, prop_schema) in properties {
            converted_props.insert(name.clone(), convert_schema(prop_schema));
        }
        out.insert("properties".to_string(), Value::Object(converted_props));
    }

    if let Some(required) = raw.get("required") {
        out.insert("required".to_string(), required.clone());
    }

    if let Some(additional) = raw.get("additionalProperties") {
        out.insert("additionalProperties".to_string(), additional.clone());
    }

    Value::Object(out)
}

/// Convert a parameter's schema, preserving its location as an
/// `x-parameter-in` marker the execution dispatcher reads back later.
pub fn convert_parameter(param: &OpenApiParameter) -> Value {
    let mut schema = convert_schema(&param.schema);
    if let Value::Object(ref mut map) = schema {
        map.insert(
            "x-parameter-in".to_string(),
            Value::String(param.location.as_str().to_string()),
        );
    }
    schema
}

/// Convert a request body into the `"body"` entry of a tool's
/// `inputSchema.properties`. Returns `None` when the operation has no
/// request body or the selected media type carries no schema.
pub fn convert_request_body(body: &RequestBody) -> Option<Value> {
    let (content_type, raw_schema) = body.content.as_ref()?;
    let mut schema = convert_schema(raw_schema);

    if let Value::Object(ref mut map) = schema {
        if let Some(description) = &body.description {
            map.entry("description").or_insert_with(|| Value::String(description.clone()));
        }
        if content_type != "application/json" {
            map.insert("x-content-type".to_string(), Value::String(content_type.clone()));
        }
    }

    Some(schema)
}

pub fn location_of(schema: &Value) -> Option<ParameterLocation> {
    schema
        .get("x-parameter-in")
        .and_then(Value::as_str)
        .and_then(ParameterLocation::from_str_pub)
}

// Small accessor so `dispatcher.rs` doesn't need to re-match strings.
impl ParameterLocation {
    pub fn from_str_pub(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn copies_basic_keys_and_constraints() {
        let raw = json!({
            "type": "string",
            "format": "uuid",
            "minLength": 3,
            "maxLength": 20,
            "pattern": "^[a-z]+$",
            "description": "an id",
            "example": "abc",
        });
        let converted = convert_schema(&raw);
        assert_eq!(converted["type"], "string");
        assert_eq!(converted["minLength"], 3);
        assert_eq!(converted["pattern"], "^[a-z]+$");
        assert_eq!(converted["description"], "an id");
    }

    #[test]
    fn recurses_into_array_items() {
        let raw = json!({
            "type": "array",
            "minItems": 1,
            "items": {"type": "string", "enum": ["a", "b"]}
        });
        let converted = convert_schema(&raw);
        assert_eq!(converted["items"]["type"], "string");
        assert_eq!(converted["items"]["enum"], json!(["a", "b"]));
    }

    #[test]
    fn recurses_into_object_properties() {
        let raw = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer", "minimum": 0}
            },
            "required": ["name"],
            "additionalProperties": false
        });
        let converted = convert_schema(&raw);
        assert_eq!(converted["properties"]["age"]["minimum"], 0);
        assert_eq!(converted["required"], json!(["name"]));
        assert_eq!(converted["additionalProperties"], false);
    }

    #[test]
    fn unknown_input_degrades_to_empty_object() {
        let converted = convert_schema(&Value::String("not a schema".to_string()));
        assert_eq!(converted, json!({}));
    }

    #[test]
    fn parameter_conversion_marks_location() {
        let param = OpenApiParameter {
            name: "id".to_string(),
            location: ParameterLocation::Path,
            required: true,
            schema: json!({"type": "string"}),
        };
        let converted = convert_parameter(&param);
        assert_eq!(converted["x-parameter-in"], "path");
        assert_eq!(converted["type"], "string");
    }

    #[test]
    fn request_body_marks_non_default_content_type() {
        let body = RequestBody {
            required: true,
            description: Some("a widget".to_string()),
            content: Some(("application/vnd.api+json".to_string(), json!({"type": "object"}))),
        };
        let converted = convert_request_body(&body).unwrap();
        assert_eq!(converted["x-content-type"], "application/vnd.api+json");
        assert_eq!(converted["description"], "a widget");
    }

    #[test]
    fn request_body_without_content_omits_x_content_type() {
        let body = RequestBody {
            required: false,
            description: None,
            content: Some(("application/json".to_string(), json!({"type": "object"}))),
        };
        let converted = convert_request_body(&body).unwrap();
        assert!(converted.get("x-content-type").is_none());
    }

    #[test]
    fn request_body_without_schema_is_none() {
        let body = RequestBody {
            required: false,
            description: None,
            content: None,
        };
        assert!(convert_request_body(&body).is_none());
    }
}
