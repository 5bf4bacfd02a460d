//! Label normalization
//!
//! Merges policy-wide default labels, a free-form override mapping (parsed
//! from caller-supplied JSON), and explicit per-key overrides into one flat
//! string-keyed label set. Later sources win per key. All values are
//! stringified at ingestion so conditions only ever compare strings.
//!
//! No key validation happens here: unknown keys pass through and are simply
//! never referenced by any condition.

use serde_json::Value;
use std::collections::BTreeMap;

/// Flat mapping from label key to string value.
///
/// Keys not present are absent, never wildcards: a condition referencing a
/// missing key fails to match.
pub type LabelSet = BTreeMap<String, String>;

/// Label keys recognized by the standard policy vocabulary.
///
/// The engine itself does not enforce this list; it exists so callers (CLI
/// flags, presets) can enumerate the conventional keys.
pub const LABEL_KEYS: [&str; 12] = [
    "scene",
    "sensitivity",
    "task_type",
    "modality",
    "complexity",
    "value",
    "context_size",
    "language",
    "latency_budget",
    "cost_budget",
    "privacy_requirement",
    "provider_preference",
];

/// Convert a JSON value to its label string form.
///
/// Strings pass through unquoted; numbers, booleans and other values use
/// their JSON rendering.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Merge defaults, a raw override mapping, and explicit overrides into a
/// normalized label set.
///
/// Merge order (later wins): `defaults`, then every key of `raw` (full
/// replace per key), then each explicit `(key, value)` pair whose value is
/// present.
pub fn merge_labels(
    defaults: &BTreeMap<String, String>,
    raw: Option<&serde_json::Map<String, Value>>,
    explicit: &[(&str, Option<&str>)],
) -> LabelSet {
    let mut labels: LabelSet = defaults.clone();

    if let Some(raw) = raw {
        for (key, value) in raw {
            labels.insert(key.clone(), stringify(value));
        }
    }

    for (key, value) in explicit {
        if let Some(value) = value {
            labels.insert((*key).to_string(), (*value).to_string());
        }
    }

    labels
}
