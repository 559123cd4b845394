//! Decoded token claims as an identity-aware access filter sees them.

use serde_json::Value;
use std::collections::BTreeMap;

/// A caller's identity, as derived from a validated bearer token.
///
/// When OAuth is disabled entirely, callers are represented by
/// [`ClaimSet::anonymous`] — an identity that owns no claims and so only
/// satisfies access requirements that are themselves empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet {
    claims: BTreeMap<String, Value>,
}

impl ClaimSet {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_map(claims: BTreeMap<String, Value>) -> Self {
        Self { claims }
    }

    /// The claim's string values: a bare string claim splits on whitespace,
    /// an array is taken element-wise (stringifying non-string elements),
    /// and any other scalar stringifies to a single token (spec §4.6).
    pub fn values_of(&self, claim_name: &str) -> Vec<String> {
        match self.claims.get(claim_name) {
            Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
            Some(Value::Array(values)) => values.iter().map(scalar_to_token).collect(),
            Some(other) => vec![scalar_to_token(other)],
            None => Vec::new(),
        }
    }

    pub fn has_claim(&self, claim_name: &str) -> bool {
        self.claims.contains_key(claim_name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }
}

/// Stringify a single non-string-claim element the way §4.6 requires:
/// a string element is used verbatim, anything else renders as its plain
/// (unquoted) textual form.
fn scalar_to_token(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_of_splits_space_separated_scope() {
        let mut map = BTreeMap::new();
        map.insert("scope".to_string(), json!("read write admin"));
        let claims = ClaimSet::from_map(map);
        assert_eq!(claims.values_of("scope"), vec!["read", "write", "admin"]);
    }

    #[test]
    fn values_of_reads_array_claim() {
        let mut map = BTreeMap::new();
        map.insert("roles".to_string(), json!(["editor", "viewer"]));
        let claims = ClaimSet::from_map(map);
        assert_eq!(claims.values_of("roles"), vec!["editor", "viewer"]);
    }

    #[test]
    fn anonymous_has_no_claims() {
        let claims = ClaimSet::anonymous();
        assert!(claims.values_of("scope").is_empty());
        assert!(!claims.has_claim("scope"));
    }

    #[test]
    fn scalar_claim_stringifies_to_single_token() {
        let mut map = BTreeMap::new();
        map.insert("level".to_string(), json!(5));
        let claims = ClaimSet::from_map(map);
        assert_eq!(claims.values_of("level"), vec!["5"]);
    }
}
