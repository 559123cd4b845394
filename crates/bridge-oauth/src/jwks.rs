//! JWKS fetching, OIDC-discovery resolution, and per-URL caching.
//!
//! Each distinct JWKS URL gets its own cache slot guarded by an async
//! mutex, so concurrent validations against the same authorization server
//! collapse into a single outstanding HTTP fetch instead of a thundering
//! herd (spec §5: "a per-entry async mutex" for single-flight refresh).

use bridge_types::{BridgeError, BridgeResult};
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(rename = "use")]
    #[serde(default)]
    pub use_: Option<String>,
    /// RSA modulus, base64url-encoded, no padding.
    pub n: Option<String>,
    /// RSA public exponent, base64url-encoded, no padding.
    pub e: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys
            .iter()
            .find(|k| k.kid.as_deref() == Some(kid) && k.kty == "RSA")
    }
}

#[derive(Deserialize)]
struct OidcDiscoveryDocument {
    jwks_uri: String,
}

#[derive(Default)]
struct CacheEntry {
    fetched_at: Option<Instant>,
    keys: Option<Arc<JwkSet>>,
}

/// Cache + fetcher for one or more authorization servers' JWKS documents.
pub struct JwksCache {
    entries: DashMap<String, Arc<Mutex<CacheEntry>>>,
    http: reqwest::Client,
}

impl JwksCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Resolve an authorization server's JWKS endpoint. `issuer` may
    /// already be a JWKS URL (ends in a path containing "jwks"), otherwise
    /// it is treated as an OIDC issuer and resolved via
    /// `{issuer}/.well-known/openid-configuration`.
    pub async fn resolve_jwks_uri(&self, issuer: &str) -> BridgeResult<String> {
        if issuer.contains("jwks") {
            return Ok(issuer.to_string());
        }

        let discovery_url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );
        let resp = self
            .http
            .get(&discovery_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| BridgeError::AuthFailed(format!("OIDC discovery fetch failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(BridgeError::AuthFailed(format!(
                "OIDC discovery at {discovery_url} returned {}",
                resp.status()
            )));
        }

        let doc: OidcDiscoveryDocument = resp
            .json()
            .await
            .map_err(|e| BridgeError::AuthFailed(format!("invalid OIDC discovery document: {e}")))?;
        Ok(doc.jwks_uri)
    }

    /// Fetch the key set for `jwks_uri`, serving a cached copy when one
    /// younger than the TTL exists. Concurrent callers for the same URL
    /// share a single in-flight fetch.
    pub async fn get_keys(&self, jwks_uri: &str) -> BridgeResult<Arc<JwkSet>> {
        let slot = self
            .entries
            .entry(jwks_uri.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CacheEntry::default())))
            .clone();

        let mut entry = slot.lock().await;
        if let (Some(fetched_at), Some(keys)) = (entry.fetched_at, &entry.keys) {
            if fetched_at.elapsed() < CACHE_TTL {
                return Ok(keys.clone());
            }
        }

        self.fetch_into(jwks_uri, &mut *entry).await
    }

    /// Unconditionally refetch `jwks_uri`, bypassing the TTL. Used to give
    /// a rolled-over `kid` a single chance before validation fails (spec
    /// §4.5 step 3). Still serialised per-URL through the same async
    /// mutex as `get_keys`, so a rollover on one issuer's key set never
    /// blocks lookups against another.
    pub async fn force_refresh(&self, jwks_uri: &str) -> BridgeResult<Arc<JwkSet>> {
        let slot = self
            .entries
            .entry(jwks_uri.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CacheEntry::default())))
            .clone();

        let mut entry = slot.lock().await;
        self.fetch_into(jwks_uri, &mut *entry).await
    }

    async fn fetch_into(&self, jwks_uri: &str, entry: &mut CacheEntry) -> BridgeResult<Arc<JwkSet>> {
        let resp = self
            .http
            .get(jwks_uri)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| BridgeError::AuthFailed(format!("JWKS fetch failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(BridgeError::AuthFailed(format!(
                "JWKS endpoint {jwks_uri} returned {}",
                resp.status()
            )));
        }

        let set: JwkSet = resp
            .json()
            .await
            .map_err(|e| BridgeError::AuthFailed(format!("invalid JWKS document: {e}")))?;
        let set = Arc::new(set);

        entry.keys = Some(set.clone());
        entry.fetched_at = Some(Instant::now());
        Ok(set)
    }
}

impl Default for JwksCache {
    fn default() -> Self {
        Self::new()
    }
}
