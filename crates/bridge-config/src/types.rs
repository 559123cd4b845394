//! Typed configuration model.
//!
//! `ServerConfig` and `RouteToolConfig` are the two structs the rest of the
//! bridge is built from. Both are plain serde types so they can be loaded
//! from a YAML/JSON file or constructed in-process by an embedder.

use serde::{Deserialize, Serialize};

fn default_server_name() -> String {
    "kong-mcp".to_string()
}

fn default_server_version() -> String {
    "1.0.0".to_string()
}

fn default_max_tools() -> usize {
    1000
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_mcp_path() -> String {
    "/mcp".to_string()
}

fn default_true() -> bool {
    true
}

/// Root server configuration. Immutable for the lifetime of a worker;
/// reload replaces the whole value atomically (see `ConfigStore`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub server_name: String,

    #[serde(default = "default_server_version")]
    pub server_version: String,

    #[serde(default = "default_max_tools")]
    pub max_tools: usize,

    /// Address the HTTP listener binds to. Ambient transport concern, not
    /// part of the MCP protocol surface itself.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path of the single MCP endpoint (GET + POST).
    #[serde(default = "default_mcp_path")]
    pub mcp_path: String,

    #[serde(default)]
    pub oauth: OAuthConfig,

    /// The routed upstreams this bridge synthesises tools from.
    #[serde(default)]
    pub routes: Vec<RouteToolConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            server_version: default_server_version(),
            max_tools: default_max_tools(),
            bind_addr: default_bind_addr(),
            mcp_path: default_mcp_path(),
            oauth: OAuthConfig::default(),
            routes: Vec::new(),
        }
    }
}

/// How bearer tokens are validated. Only `Jwt` is implemented by the core;
/// `Introspection` is accepted as a config value but rejected at load time
/// (see `ServerConfig::validate` and DESIGN.md's Open Question decision).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenValidation {
    #[default]
    Jwt,
    Introspection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OAuthConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub authorization_servers: Vec<String>,

    #[serde(default)]
    pub audience: Option<String>,

    #[serde(default)]
    pub required_scopes: Vec<String>,

    #[serde(default)]
    pub token_validation: TokenValidation,

    #[serde(default)]
    pub tool_scope_filtering: bool,
}

/// A requirement's combine mode: does the caller need *all* of the listed
/// claim values, or is *any* one of them sufficient?
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Any,
    All,
}

/// A single access-control predicate over a caller's claim set (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessRequirement {
    pub claim_name: String,

    #[serde(default)]
    pub claim_values: Vec<String>,

    pub match_type: MatchType,

    /// When present in `per_operation_requirements`, names the operation
    /// this requirement overrides the route default for.
    #[serde(default)]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AccessControl {
    #[serde(default)]
    pub default_requirements: Vec<AccessRequirement>,

    #[serde(default)]
    pub per_operation_requirements: Vec<AccessRequirement>,
}

/// One routed upstream: an OpenAPI/Swagger document plus the plumbing
/// needed to turn its operations into MCP tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteToolConfig {
    pub route_id: String,

    pub route_name: String,

    pub upstream_base_path: String,

    /// Inline OpenAPI 3.x or Swagger 2.0 document, JSON-encoded.
    pub api_specification: String,

    #[serde(default)]
    pub tool_prefix: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub access_control: Option<AccessControl>,
}
