//! JWT parsing and RSA signature verification.
//!
//! Only the RS256/RS384/RS512 family is accepted (spec §4.5: "JWT parsing
//! restricted to RSA-family algorithms"). Verification is done directly
//! against `ring`, matching this stack's existing crypto usage rather than
//! pulling in a dedicated JWT crate.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_types::{BridgeError, BridgeResult};
use ring::signature;
use serde::Deserialize;
use serde_json::Value;

use crate::jwks::Jwk;

#[derive(Debug, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub kid: Option<String>,
}

/// A JWT that has passed signature verification, split into its header
/// and claim payload.
pub struct VerifiedJwt {
    pub header: JwtHeader,
    pub claims: Value,
}

fn rsa_algorithm(alg: &str) -> BridgeResult<&'static dyn signature::VerificationAlgorithm> {
    match alg {
        "RS256" => Ok(&signature::RSA_PKCS1_2048_8192_SHA256),
        "RS384" => Ok(&signature::RSA_PKCS1_2048_8192_SHA384),
        "RS512" => Ok(&signature::RSA_PKCS1_2048_8192_SHA512),
        other => Err(BridgeError::AuthFailed(format!(
            "unsupported JWT algorithm: {other}"
        ))),
    }
}

/// Split, base64url-decode, and verify a compact JWT's signature against
/// the given JWK. Returns the decoded header and claims on success.
///
/// Never logs the token or decoded claims: callers must not log this
/// function's inputs on error either (spec §4.5).
pub fn verify(token: &str, jwk: &Jwk) -> BridgeResult<VerifiedJwt> {
    let mut parts = token.split('.');
    let (header_b64, payload_b64, signature_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => return Err(BridgeError::AuthFailed("malformed JWT".to_string())),
        };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| BridgeError::AuthFailed("invalid JWT header encoding".to_string()))?;
    let header: JwtHeader = serde_json::from_slice(&header_bytes)
        .map_err(|_| BridgeError::AuthFailed("invalid JWT header".to_string()))?;

    let algorithm = rsa_algorithm(&header.alg)?;

    let n = jwk
        .n
        .as_deref()
        .ok_or_else(|| BridgeError::AuthFailed("JWK missing modulus".to_string()))?;
    let e = jwk
        .e
        .as_deref()
        .ok_or_else(|| BridgeError::AuthFailed("JWK missing exponent".to_string()))?;
    let n = URL_SAFE_NO_PAD
        .decode(n)
        .map_err(|_| BridgeError::AuthFailed("invalid JWK modulus encoding".to_string()))?;
    let e = URL_SAFE_NO_PAD
        .decode(e)
        .map_err(|_| BridgeError::AuthFailed("invalid JWK exponent encoding".to_string()))?;

    let public_key = signature::RsaPublicKeyComponents { n, e };

    let signed_data = format!("{header_b64}.{payload_b64}");
    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| BridgeError::AuthFailed("invalid JWT signature encoding".to_string()))?;

    public_key
        .verify(algorithm, signed_data.as_bytes(), &signature_bytes)
        .map_err(|_| BridgeError::AuthFailed("JWT signature verification failed".to_string()))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| BridgeError::AuthFailed("invalid JWT payload encoding".to_string()))?;
    let claims: Value = serde_json::from_slice(&payload_bytes)
        .map_err(|_| BridgeError::AuthFailed("invalid JWT claims".to_string()))?;

    Ok(VerifiedJwt { header, claims })
}

/// Peek at a JWT's `kid` and `alg` without verifying the signature, so the
/// caller can pick the right JWK before doing the expensive verify step.
pub fn peek_header(token: &str) -> BridgeResult<JwtHeader> {
    let header_b64 = token
        .split('.')
        .next()
        .ok_or_else(|| BridgeError::AuthFailed("malformed JWT".to_string()))?;
    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| BridgeError::AuthFailed("invalid JWT header encoding".to_string()))?;
    serde_json::from_slice(&header_bytes)
        .map_err(|_| BridgeError::AuthFailed("invalid JWT header".to_string()))
}
