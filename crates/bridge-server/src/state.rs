//! Shared server state.
//!
//! Holds the atomically-swappable config and tool registry snapshots, the
//! OAuth validator (and its JWKS cache), and the HTTP client the
//! execution dispatcher sends upstream calls through. Every field is an
//! `Arc`-backed handle, so cloning `AppState` is cheap and safe to hand to
//! every request (spec §5's snapshot-and-swap discipline).

use std::sync::Arc;

use bridge_config::{ConfigStore, ServerConfig};
use bridge_core::Registry;
use bridge_oauth::Validator;
use parking_lot::RwLock;

#[derive(Clone)]
pub struct AppState {
    config: ConfigStore,
    registry: Arc<RwLock<Arc<Registry>>>,
    validator: Arc<Validator>,
    http_client: reqwest::Client,
}

impl AppState {
    /// Build the initial state from a loaded `ServerConfig`, synthesising
    /// the tool registry from its routes up front.
    pub fn new(config: ServerConfig) -> Self {
        let registry = Registry::build(&config);
        Self {
            config: ConfigStore::new(config),
            registry: Arc::new(RwLock::new(Arc::new(registry))),
            validator: Arc::new(Validator::new()),
            http_client: reqwest::Client::new(),
        }
    }

    /// Current configuration snapshot. Cheap: clones an `Arc`.
    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.snapshot()
    }

    /// Current tool registry snapshot. Cheap: clones an `Arc`.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.read().clone()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Validate and atomically swap in a new configuration, rebuilding the
    /// tool registry from it. Readers mid-request keep seeing the old
    /// config/registry pair in full until this completes (spec §5).
    pub fn reload(&self, config: ServerConfig) -> bridge_types::BridgeResult<()> {
        self.config.reload(config)?;
        let fresh = Registry::build(&self.config.snapshot());
        *self.registry.write() = Arc::new(fresh);
        Ok(())
    }
}
