//! Default on-disk location for the bridge's configuration file.

use bridge_types::{BridgeError, BridgeResult};
use std::path::PathBuf;

/// Default configuration file path.
///
/// Priority:
/// 1. `KONG_MCP_CONFIG` environment variable, if set, used verbatim.
/// 2. `~/.kong-mcp-bridge/config.yaml`.
pub fn config_file() -> BridgeResult<PathBuf> {
    if let Ok(path) = std::env::var("KONG_MCP_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let home = std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| BridgeError::Config("could not determine home directory".to_string()))?;

    Ok(home.join(".kong-mcp-bridge").join("config.yaml"))
}
