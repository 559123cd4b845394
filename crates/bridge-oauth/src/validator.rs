//! Top-level bearer-token validation entrypoint (spec §4.5).
//!
//! `Validator::validate` runs the full nine-step procedure: anonymous
//! short-circuit when OAuth is disabled, JWKS URL resolution (with OIDC
//! discovery fallback), cached fetch, algorithm/kid lookup, signature
//! verification, `exp`/`nbf`, audience, and required-scope checks. Callers
//! get back either a `ClaimSet` or a `BridgeError::AuthFailed` — the error
//! message is generic by design; decoded claims are never logged on a
//! failure path (spec §4.5, security requirement).

use bridge_config::OAuthConfig;
use bridge_types::{BridgeError, BridgeResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::claims::ClaimSet;
use crate::jwks::JwksCache;
use crate::jwt;

pub struct Validator {
    jwks: JwksCache,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            jwks: JwksCache::new(),
        }
    }

    /// Validate `token` (the raw bearer credential, without the `Bearer `
    /// prefix) against `cfg`. When `cfg.enabled` is false the caller is
    /// treated as anonymous and no token is required or inspected.
    pub async fn validate(&self, token: Option<&str>, cfg: &OAuthConfig) -> BridgeResult<ClaimSet> {
        if !cfg.enabled {
            return Ok(ClaimSet::anonymous());
        }

        let token = token.ok_or_else(|| BridgeError::AuthFailed("Missing authorization token".to_string()))?;

        if cfg.authorization_servers.is_empty() {
            return Err(BridgeError::AuthFailed(
                "oauth enabled with no authorization_servers configured".to_string(),
            ));
        }

        let header = jwt::peek_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| BridgeError::AuthFailed("JWT missing kid".to_string()))?;

        // Try each configured authorization server until one has the kid.
        let mut last_err = None;
        for issuer in &cfg.authorization_servers {
            match self.validate_against_issuer(token, &kid, issuer, cfg).await {
                Ok(claims) => return Ok(claims),
                Err(e) => last_err = Some(e),
            }
        }

        warn!("bearer token rejected by all configured authorization servers");
        Err(last_err
            .unwrap_or_else(|| BridgeError::AuthFailed("token validation failed".to_string())))
    }

    async fn validate_against_issuer(
        &self,
        token: &str,
        kid: &str,
        issuer: &str,
        cfg: &OAuthConfig,
    ) -> BridgeResult<ClaimSet> {
        let jwks_uri = self.jwks.resolve_jwks_uri(issuer).await?;
        let mut key_set = self.jwks.get_keys(&jwks_uri).await?;
        if key_set.find(kid).is_none() {
            // A cache hit that doesn't carry this kid might just be stale
            // (key rollover at the issuer) -- force one refetch before
            // giving up (spec §4.5 step 3).
            key_set = self.jwks.force_refresh(&jwks_uri).await?;
        }
        let jwk = key_set
            .find(kid)
            .ok_or_else(|| BridgeError::AuthFailed("no matching JWK for kid".to_string()))?;

        let verified = jwt::verify(token, jwk)?;
        check_time_bounds(&verified.claims)?;
        check_audience(&verified.claims, cfg.audience.as_deref())?;
        check_scopes(&verified.claims, &cfg.required_scopes)?;

        let Value::Object(map) = verified.claims else {
            return Err(BridgeError::AuthFailed("JWT claims must be an object".to_string()));
        };
        Ok(ClaimSet::from_map(map.into_iter().collect::<BTreeMap<_, _>>()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// No clock-skew tolerance: `exp` and `nbf` are checked against the exact
/// current time (spec §4.5).
fn check_time_bounds(claims: &Value) -> BridgeResult<()> {
    let now = now_secs();

    if let Some(exp) = claims.get("exp").and_then(Value::as_i64) {
        if now >= exp {
            return Err(BridgeError::AuthFailed("token expired".to_string()));
        }
    } else {
        return Err(BridgeError::AuthFailed("token missing exp claim".to_string()));
    }

    if let Some(nbf) = claims.get("nbf").and_then(Value::as_i64) {
        if now < nbf {
            return Err(BridgeError::AuthFailed("token not yet valid".to_string()));
        }
    }

    Ok(())
}

fn check_audience(claims: &Value, expected: Option<&str>) -> BridgeResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let matches = match claims.get("aud") {
        Some(Value::String(s)) => s == expected,
        Some(Value::Array(values)) => values.iter().any(|v| v.as_str() == Some(expected)),
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(BridgeError::AuthFailed("audience mismatch".to_string()))
    }
}

fn check_scopes(claims: &Value, required: &[String]) -> BridgeResult<()> {
    if required.is_empty() {
        return Ok(());
    }

    let granted: Vec<&str> = match claims.get("scope") {
        Some(Value::String(s)) => s.split_whitespace().collect(),
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    let missing: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|s| !granted.contains(s))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BridgeError::AuthFailed(format!(
            "missing required scope(s): {}",
            missing.join(", ")
        )))
    }
}
