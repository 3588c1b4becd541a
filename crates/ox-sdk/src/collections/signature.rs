//! Query signatures: cache keys for pooled collections.

use ox_core::QueryParams;

/// Signature used when no parameter survives filtering.
pub const DEFAULT_SIGNATURE: &str = "default";

/// Compute the canonical signature of a parameter set.
///
/// Ignored keys are dropped, the rest are rendered as `key=value`, sorted
/// lexicographically and joined with `&`. The result does not depend on
/// the order parameters were inserted in.
pub fn signature(params: &QueryParams, ignore: &[String]) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .filter(|(key, _)| !ignore.iter().any(|i| i == *key))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    if pairs.is_empty() {
        return DEFAULT_SIGNATURE.to_string();
    }

    pairs.sort();
    pairs.join("&")
}
