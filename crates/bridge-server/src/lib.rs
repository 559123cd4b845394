//! HTTP transport and process wiring for the Kong MCP bridge (SPEC_FULL.md
//! §4.10, ambient).
//!
//! Everything with a real contract — protocol parsing, tool synthesis,
//! OAuth verification, access filtering, dispatch — lives in
//! `bridge-core`/`bridge-oauth`/`bridge-config`. This crate only wires
//! those pieces to an axum `Router` exposing the single configured MCP
//! endpoint, plus the binary entry point that loads configuration and
//! serves it.

pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum router for a bridge instance. There is exactly one
/// meaningful path — `state.config().mcp_path` — bound to both `GET`
/// (capability discovery) and `POST` (JSON-RPC dispatch); both handlers
/// share `routes::mcp::handle_get` / `handle_post`.
pub fn build_router(state: AppState) -> Router {
    let mcp_path = state.config().mcp_path.clone();

    Router::new()
        .route(&mcp_path, get(routes::mcp::handle_get).post(routes::mcp::handle_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
