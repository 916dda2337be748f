// Canonical parameter ordering for signing.

use std::collections::HashMap;

/// Named request parameters that take part in a signature.
pub type ParameterSet = HashMap<String, String>;

/// Order a parameter set by name, byte-wise.
///
/// Names are unique map keys, so the order is total and does not depend on
/// how the set was built.
pub fn canonicalize(params: &ParameterSet) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    pairs.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    pairs
}
