//! Cache key derivation and operation classification
//!
//! A key is built from an operation name and its parameters, never from the
//! full request URL, so the API secret can never leak into it. Keys are
//! path-like (`getbill/101`) and double as file names once sanitized by the
//! store.

use std::collections::BTreeMap;

/// Query parameter holding the API secret; always excluded from keys.
const SECRET_PARAM: &str = "key";

/// Parameters whose values lead the key, in this order, when present.
const PREFERRED_PARAMS: [&str; 2] = ["state", "year"];

/// Operations whose result never changes once issued for a given id.
const STATIC_OPS: [&str; 4] = ["getbilltext", "getamendment", "getsupplement", "getrollcall"];

/// Derive the canonical cache key for an operation and its parameters.
///
/// The operation name comes first, then the values of `state` and `year`
/// when supplied, then the remaining parameter values ordered by parameter
/// name. The result is lowercased and `/`-joined, so two calls that differ
/// only in parameter order produce the same key.
pub fn cache_key(op: &str, params: &[(&str, &str)]) -> String {
    let mut by_name: BTreeMap<&str, &str> = params
        .iter()
        .filter(|(name, _)| *name != SECRET_PARAM)
        .copied()
        .collect();

    let mut parts: Vec<&str> = vec![op];
    for preferred in PREFERRED_PARAMS {
        if let Some(value) = by_name.remove(preferred) {
            parts.push(value);
        }
    }
    // BTreeMap iteration gives the remaining values in parameter-name order
    parts.extend(by_name.into_values());

    parts.join("/").to_ascii_lowercase()
}

/// Whether an operation fetches an immutable artifact (document text,
/// roll-call detail). Static results are cached without expiry.
pub fn is_static_op(op: &str) -> bool {
    STATIC_OPS.contains(&op.to_ascii_lowercase().as_str())
}

/// TTL to apply when caching the result of `op`: zero (never expires) for
/// static operations, the configured TTL otherwise.
pub fn ttl_for(op: &str, default_ttl_secs: u64) -> u64 {
    if is_static_op(op) {
        0
    } else {
        default_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable_under_parameter_reordering() {
        let a = cache_key("getSearch", &[("query", "water"), ("state", "TX"), ("page", "2")]);
        let b = cache_key("getSearch", &[("page", "2"), ("query", "water"), ("state", "TX")]);
        assert_eq!(a, b);
    }

    #[test]
    fn preferred_params_lead_remaining_sorted_by_name() {
        // state and year come first; then access_key/format/id by name
        let key = cache_key(
            "getDatasetRaw",
            &[
                ("id", "1799"),
                ("format", "json"),
                ("access_key", "XyZ"),
                ("state", "TX"),
                ("year", "2023"),
            ],
        );
        assert_eq!(key, "getdatasetraw/tx/2023/xyz/json/1799");
    }

    #[test]
    fn secret_never_appears_in_key() {
        let key = cache_key("getBill", &[("key", "s3cr3t"), ("id", "101")]);
        assert_eq!(key, "getbill/101");
        assert!(!key.contains("s3cr3t"));
    }

    #[test]
    fn key_is_lowercased() {
        assert_eq!(cache_key("getMasterListRaw", &[("id", "2049")]), "getmasterlistraw/2049");
    }

    #[test]
    fn static_classification_matches_fixed_table() {
        for op in ["getBillText", "getAmendment", "getSupplement", "getRollCall"] {
            assert!(is_static_op(op), "{op} should be static");
        }
        for op in ["getBill", "getPerson", "getMasterListRaw", "getDatasetRaw", "getSessionList"] {
            assert!(!is_static_op(op), "{op} should be refreshable");
        }
    }

    #[test]
    fn ttl_is_zero_only_for_static_ops() {
        assert_eq!(ttl_for("getRollCall", 14400), 0);
        assert_eq!(ttl_for("getBill", 14400), 14400);
    }
}
