//! Named label bundles for common routing scenarios
//!
//! Presets are shorthand: they merge below explicit label flags, so any
//! flag still overrides the preset's value for that key.

use std::collections::BTreeMap;

/// Label bundle for one preset, in a deterministic key order.
pub type Preset = BTreeMap<&'static str, &'static str>;

/// All built-in presets, keyed by name.
pub fn presets() -> BTreeMap<&'static str, Preset> {
    let mut out: BTreeMap<&'static str, Preset> = BTreeMap::new();

    out.insert(
        "sensitive-research",
        preset(&[
            ("scene", "work"),
            ("task_type", "deep_research"),
            ("sensitivity", "sensitive_research"),
            ("complexity", "high"),
            ("value", "high"),
            ("context_size", "long"),
        ]),
    );
    out.insert(
        "research-cn",
        preset(&[
            ("scene", "work"),
            ("task_type", "deep_research"),
            ("sensitivity", "normal"),
            ("provider_preference", "domestic_first"),
            ("complexity", "medium"),
            ("value", "normal"),
        ]),
    );
    out.insert(
        "research-cn-high",
        preset(&[
            ("scene", "work"),
            ("task_type", "deep_research"),
            ("sensitivity", "normal"),
            ("provider_preference", "domestic_first"),
            ("complexity", "high"),
            ("value", "high"),
            ("context_size", "long"),
        ]),
    );
    out.insert(
        "coding-cn",
        preset(&[
            ("scene", "work"),
            ("task_type", "coding"),
            ("provider_preference", "domestic_first"),
            ("complexity", "high"),
            ("value", "high"),
            ("context_size", "long"),
        ]),
    );
    out.insert(
        "private",
        preset(&[
            ("scene", "private"),
            ("sensitivity", "intimate"),
            ("task_type", "writing"),
            ("complexity", "low"),
            ("value", "normal"),
            ("privacy_requirement", "strict"),
        ]),
    );
    out.insert(
        "private-complex",
        preset(&[
            ("scene", "private"),
            ("sensitivity", "intimate"),
            ("task_type", "writing"),
            ("complexity", "high"),
            ("value", "high"),
            ("privacy_requirement", "strict"),
        ]),
    );
    out.insert(
        "work-complex",
        preset(&[
            ("scene", "work"),
            ("sensitivity", "normal"),
            ("task_type", "planning"),
            ("complexity", "high"),
            ("value", "high"),
        ]),
    );

    out
}

/// Look up one preset by name.
pub fn preset_labels(name: &str) -> Option<Preset> {
    presets().remove(name)
}

/// Render the preset list for `--list-presets`.
pub fn format_presets() -> String {
    let mut lines = vec!["Available presets:".to_string()];
    for (name, labels) in presets() {
        let rendered: Vec<String> = labels.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        lines.push(format!("  {:18} {}", name, rendered.join(" ")));
    }
    lines.join("\n")
}

fn preset(pairs: &[(&'static str, &'static str)]) -> Preset {
    pairs.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_preset() {
        let labels = preset_labels("coding-cn").unwrap();
        assert_eq!(labels["task_type"], "coding");
        assert_eq!(labels["provider_preference"], "domestic_first");
    }

    #[test]
    fn test_unknown_preset() {
        assert!(preset_labels("no-such-preset").is_none());
    }

    #[test]
    fn test_listing_mentions_every_preset() {
        let listing = format_presets();
        for name in presets().keys() {
            assert!(listing.contains(name), "missing {} in listing", name);
        }
    }
}
