//! Shared types and error taxonomy for the Kong MCP bridge.

pub mod errors;
pub mod mcp_types;

pub use errors::{BridgeError, BridgeResult};
pub use mcp_types::McpTool;
