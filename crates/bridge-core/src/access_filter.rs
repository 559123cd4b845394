//! Per-tool claim-based access control (spec §4.6).
//!
//! Applied identically at `tools/list` (visibility) and `tools/call`
//! (execution) — defence in depth, per spec.

use bridge_config::{AccessRequirement, MatchType};
use bridge_oauth::ClaimSet;

/// Evaluate a list of requirements against a caller's claim set. An empty
/// list is public (always passes); multiple requirements are AND-combined.
pub fn evaluate(claims: &ClaimSet, requirements: &[AccessRequirement]) -> bool {
    requirements.iter().all(|req| evaluate_one(claims, req))
}

fn evaluate_one(claims: &ClaimSet, req: &AccessRequirement) -> bool {
    if !claims.has_claim(&req.claim_name) {
        return false;
    }

    let tokens = claims.values_of(&req.claim_name);
    let matched = req.claim_values.iter().filter(|v| tokens.contains(v)).count();

    match req.match_type {
        MatchType::All => matched == req.claim_values.len(),
        MatchType::Any => matched > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn claims_with(claim: &str, value: serde_json::Value) -> ClaimSet {
        let mut map = BTreeMap::new();
        map.insert(claim.to_string(), value);
        ClaimSet::from_map(map)
    }

    fn requirement(values: &[&str], match_type: MatchType) -> AccessRequirement {
        AccessRequirement {
            claim_name: "permissions".to_string(),
            claim_values: values.iter().map(|s| s.to_string()).collect(),
            match_type,
            operation_id: None,
        }
    }

    #[test]
    fn empty_requirement_list_is_public() {
        assert!(evaluate(&ClaimSet::anonymous(), &[]));
    }

    #[test]
    fn missing_claim_fails() {
        let req = requirement(&["read"], MatchType::Any);
        assert!(!evaluate(&ClaimSet::anonymous(), &[req]));
    }

    #[test]
    fn any_passes_with_one_match() {
        let claims = claims_with("permissions", json!(["read", "other"]));
        let req = requirement(&["read", "write"], MatchType::Any);
        assert!(evaluate(&claims, &[req]));
    }

    #[test]
    fn any_fails_with_no_match() {
        let claims = claims_with("permissions", json!(["other"]));
        let req = requirement(&["read", "write"], MatchType::Any);
        assert!(!evaluate(&claims, &[req]));
    }

    #[test]
    fn all_requires_every_value() {
        let claims = claims_with("permissions", json!(["read", "write"]));
        let req = requirement(&["read", "write"], MatchType::All);
        assert!(evaluate(&claims, &[req]));

        let partial = claims_with("permissions", json!(["read"]));
        let req2 = requirement(&["read", "write"], MatchType::All);
        assert!(!evaluate(&partial, &[req2]));
    }

    #[test]
    fn scalar_claim_stringifies_to_single_token() {
        let claims = claims_with("level", json!(5));
        let req = AccessRequirement {
            claim_name: "level".to_string(),
            claim_values: vec!["5".to_string()],
            match_type: MatchType::Any,
            operation_id: None,
        };
        // Non-string/array scalars stringify to a single token (spec §4.6).
        assert!(evaluate(&claims, &[req]));
    }

    #[test]
    fn multiple_requirements_are_and_combined() {
        let mut map = BTreeMap::new();
        map.insert("permissions".to_string(), json!(["read"]));
        map.insert("tenant".to_string(), json!("acme"));
        let claims = ClaimSet::from_map(map);

        let r1 = requirement(&["read"], MatchType::Any);
        let r2 = AccessRequirement {
            claim_name: "tenant".to_string(),
            claim_values: vec!["acme".to_string()],
            match_type: MatchType::All,
            operation_id: None,
        };
        assert!(evaluate(&claims, &[r1.clone(), r2.clone()]));

        let r3 = AccessRequirement {
            claim_name: "tenant".to_string(),
            claim_values: vec!["other".to_string()],
            match_type: MatchType::All,
            operation_id: None,
        };
        assert!(!evaluate(&claims, &[r1, r3]));
    }

    #[test]
    fn exhaustive_truth_table() {
        for (claim_values, present, match_type, expected) in [
            (vec!["a"], vec!["a"], MatchType::Any, true),
            (vec!["a"], vec!["b"], MatchType::Any, false),
            (vec!["a", "b"], vec!["b"], MatchType::Any, true),
            (vec!["a", "b"], vec!["a", "b"], MatchType::All, true),
            (vec!["a", "b"], vec!["a"], MatchType::All, false),
            (vec!["a", "b"], vec![], MatchType::All, false),
            (vec!["a", "b"], vec![], MatchType::Any, false),
        ] {
            let claims = claims_with(
                "permissions",
                serde_json::Value::Array(present.iter().map(|s| json!(s)).collect()),
            );
            let req = requirement(&claim_values, match_type);
            assert_eq!(evaluate(&claims, &[req]), expected, "{claim_values:?} vs {present:?} ({match_type:?})");
        }
    }
}
