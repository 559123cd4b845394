//! The MCP/JSON-RPC protocol engine: OpenAPI tool synthesis, the tool
//! registry and access filter, JSON-RPC parsing/encoding, and the
//! execution dispatcher that proxies a tool call to its upstream route.

pub mod access_filter;
pub mod dispatcher;
pub mod openapi;
pub mod registry;
pub mod rpc;
pub mod schema;
pub mod synthesizer;

pub use dispatcher::{dispatch, DispatchResult};
pub use registry::{Lookup, Registry, ToolRecord};
pub use rpc::{ParseOutcome, RpcError, RpcRequest, RpcResponse};
