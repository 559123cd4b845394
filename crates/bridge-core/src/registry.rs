//! The authoritative tool registry (spec §4.4).
//!
//! Built once from a `ServerConfig`'s routes and held as an immutable
//! snapshot — there is no per-request mutation path. A reload rebuilds a
//! fresh `Registry` and the caller swaps it in (mirroring `ConfigStore`'s
//! atomic-swap discipline, spec §5).

use crate::access_filter;
use crate::openapi::{self, HttpMethod};
use crate::synthesizer;
use bridge_config::{AccessRequirement, RouteToolConfig, ServerConfig};
use bridge_oauth::ClaimSet;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// One row of the tool registry (spec §3 "ToolRecord").
#[derive(Debug, Clone)]
pub struct ToolRecord {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub http_method: HttpMethod,
    /// OpenAPI path template, e.g. `/plugins/{id}`.
    pub endpoint_path: String,
    pub route_id: String,
    pub route_name: String,
    pub route_base_path: String,
    pub operation_id: Option<String>,
    pub access_requirements: Vec<AccessRequirement>,
}

impl ToolRecord {
    /// The `{name, description, inputSchema}` projection returned by
    /// `tools/list` — execution metadata is stripped (spec §4.8).
    pub fn list_projection(&self) -> bridge_types::McpTool {
        bridge_types::McpTool {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: self.input_schema.clone(),
        }
    }

    fn visible_to(&self, claims: &ClaimSet) -> bool {
        access_filter::evaluate(claims, &self.access_requirements)
    }
}

pub enum Lookup<'a> {
    Found(&'a ToolRecord),
    NotFound,
    Forbidden,
}

/// Immutable, built-at-load-time map of tool name → `ToolRecord`.
#[derive(Debug, Default)]
pub struct Registry {
    tools: HashMap<String, ToolRecord>,
}

impl Registry {
    /// Build a registry from every enabled route in `config`. A route
    /// whose OpenAPI document fails to parse produces no tools but does
    /// not abort the build (spec §7: "fatal for that RouteToolConfig").
    /// Duplicate tool names lose to the first writer (spec §4.3); once
    /// `max_tools` is reached, further tools are dropped and logged
    /// (spec §4.4).
    pub fn build(config: &ServerConfig) -> Self {
        let mut tools: HashMap<String, ToolRecord> = HashMap::new();

        for route in &config.routes {
            if !route.enabled {
                continue;
            }

            for record in synthesize_route(route) {
                if tools.len() >= config.max_tools {
                    warn!(
                        route_id = %route.route_id,
                        tool_name = %record.name,
                        max_tools = config.max_tools,
                        "dropping tool: registry at max_tools capacity"
                    );
                    continue;
                }

                if tools.contains_key(&record.name) {
                    warn!(
                        route_id = %route.route_id,
                        tool_name = %record.name,
                        "dropping duplicate tool name: first writer wins"
                    );
                    continue;
                }

                tools.insert(record.name.clone(), record);
            }
        }

        Self { tools }
    }

    /// All tools visible to `claims`. `None` means "no identity filter" —
    /// used by embedders that don't run OAuth at all; the HTTP server
    /// always supplies at least an anonymous `ClaimSet`.
    pub fn list(&self, claims: Option<&ClaimSet>) -> Vec<&ToolRecord> {
        let mut visible: Vec<&ToolRecord> = match claims {
            Some(claims) => self.tools.values().filter(|t| t.visible_to(claims)).collect(),
            None => self.tools.values().collect(),
        };
        visible.sort_by(|a, b| a.name.cmp(&b.name));
        visible
    }

    pub fn lookup(&self, name: &str, claims: Option<&ClaimSet>) -> Lookup<'_> {
        let Some(record) = self.tools.get(name) else {
            return Lookup::NotFound;
        };

        if let Some(claims) = claims {
            if !record.visible_to(claims) {
                return Lookup::Forbidden;
            }
        }

        Lookup::Found(record)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn synthesize_route(route: &RouteToolConfig) -> Vec<ToolRecord> {
    match openapi::load(&route.api_specification) {
        Ok(operations) => synthesizer::synthesize_all(route, &operations),
        Err(e) => {
            warn!(route_id = %route.route_id, error = %e, "route produced no tools: OpenAPI parse failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_config::{AccessControl, MatchType};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn status_route() -> RouteToolConfig {
        RouteToolConfig {
            route_id: "r1".to_string(),
            route_name: "admin_api".to_string(),
            upstream_base_path: "/admin".to_string(),
            api_specification: json!({
                "openapi": "3.0.0",
                "paths": {"/status": {"get": {"summary": "Get Kong status"}}}
            })
            .to_string(),
            tool_prefix: Some("admin_api".to_string()),
            enabled: true,
            access_control: None,
        }
    }

    #[test]
    fn s1_list_without_auth() {
        let mut config = ServerConfig::default();
        config.routes.push(status_route());
        let registry = Registry::build(&config);

        let tools = registry.list(None);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "admin_api_get_status");
        assert_eq!(tools[0].description, "Get Kong status");
        assert_eq!(tools[0].input_schema, json!({"type": "object", "properties": {}, "required": []}));
    }

    #[test]
    fn disabled_route_produces_no_tools() {
        let mut route = status_route();
        route.enabled = false;
        let mut config = ServerConfig::default();
        config.routes.push(route);
        let registry = Registry::build(&config);
        assert!(registry.is_empty());
    }

    #[test]
    fn bad_openapi_document_is_fatal_only_for_its_route() {
        let mut ok_route = status_route();
        ok_route.route_id = "ok".to_string();
        let mut bad_route = status_route();
        bad_route.route_id = "bad".to_string();
        bad_route.api_specification = "not json at all".to_string();

        let mut config = ServerConfig::default();
        config.routes.push(ok_route);
        config.routes.push(bad_route);

        let registry = Registry::build(&config);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn max_tools_caps_registry_size() {
        let mut config = ServerConfig::default();
        config.max_tools = 0;
        config.routes.push(status_route());
        let registry = Registry::build(&config);
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_tool_name_first_writer_wins() {
        let mut route_a = status_route();
        route_a.route_id = "a".to_string();
        let mut route_b = status_route();
        route_b.route_id = "b".to_string();

        let mut config = ServerConfig::default();
        config.routes.push(route_a);
        config.routes.push(route_b);

        let registry = Registry::build(&config);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list(None)[0].route_id, "a");
    }

    #[test]
    fn s3_filtered_list() {
        let mut route_a = RouteToolConfig {
            route_id: "a".to_string(),
            route_name: "route_a".to_string(),
            upstream_base_path: "/a".to_string(),
            api_specification: json!({
                "openapi": "3.0.0",
                "paths": {
                    "/one": {"get": {}}, "/two": {"get": {}}, "/three": {"get": {}},
                    "/four": {"get": {}}, "/five": {"get": {}}, "/six": {"get": {}},
                }
            })
            .to_string(),
            tool_prefix: Some("route_a".to_string()),
            enabled: true,
            access_control: None,
        };
        route_a.route_name = "route_a".to_string();

        let route_b = RouteToolConfig {
            route_id: "b".to_string(),
            route_name: "route_b".to_string(),
            upstream_base_path: "/b".to_string(),
            api_specification: json!({
                "openapi": "3.0.0",
                "paths": {
                    "/seven": {"get": {}}, "/eight": {"get": {}},
                    "/nine": {"get": {}}, "/ten": {"get": {}},
                }
            })
            .to_string(),
            tool_prefix: Some("route_b".to_string()),
            enabled: true,
            access_control: Some(AccessControl {
                default_requirements: vec![AccessRequirement {
                    claim_name: "permissions".to_string(),
                    claim_values: vec!["kong:read".to_string(), "kong:write".to_string()],
                    match_type: MatchType::Any,
                    operation_id: None,
                }],
                per_operation_requirements: vec![],
            }),
        };

        let mut config = ServerConfig::default();
        config.routes.push(route_a);
        config.routes.push(route_b);
        let registry = Registry::build(&config);
        assert_eq!(registry.len(), 10);

        let mut narrow = BTreeMap::new();
        narrow.insert("permissions".to_string(), json!(["read:gateway"]));
        let narrow_claims = ClaimSet::from_map(narrow);
        assert_eq!(registry.list(Some(&narrow_claims)).len(), 6);

        let mut wide = BTreeMap::new();
        wide.insert("permissions".to_string(), json!(["kong:read", "read:gateway"]));
        let wide_claims = ClaimSet::from_map(wide);
        assert_eq!(registry.list(Some(&wide_claims)).len(), 10);
    }

    #[test]
    fn lookup_distinguishes_not_found_from_forbidden() {
        let mut route = status_route();
        route.access_control = Some(AccessControl {
            default_requirements: vec![AccessRequirement {
                claim_name: "permissions".to_string(),
                claim_values: vec!["admin".to_string()],
                match_type: MatchType::All,
                operation_id: None,
            }],
            per_operation_requirements: vec![],
        });
        let mut config = ServerConfig::default();
        config.routes.push(route);
        let registry = Registry::build(&config);

        assert!(matches!(registry.lookup("nonexistent", None), Lookup::NotFound));
        assert!(matches!(
            registry.lookup("admin_api_get_status", Some(&ClaimSet::anonymous())),
            Lookup::Forbidden
        ));
        assert!(matches!(registry.lookup("admin_api_get_status", None), Lookup::Found(_)));
    }
}
