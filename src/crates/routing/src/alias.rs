//! Alias canonicalization
//!
//! Model identifiers in slots and caller allow-lists may be aliases.
//! Canonicalization follows the alias mapping iteratively until a fixed
//! point, with a visited-set guard so malformed (cyclic) alias maps still
//! terminate. Full cycle detection for configuration hygiene lives in the
//! offline validator, not here.

use std::collections::{BTreeMap, HashSet};

/// Resolve an identifier through the alias map.
///
/// Follows `aliases[id]` while the current identifier is a key in the map
/// and has not yet been visited in this resolution. On a repeat (cycle) the
/// last identifier reached is returned rather than an error.
///
/// Pure and deterministic: the same input always yields the same output for
/// a fixed alias map. Canonicalizing an already-canonical identifier
/// returns it unchanged.
pub fn canonicalize(id: &str, aliases: &BTreeMap<String, String>) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = id;

    while let Some(next) = aliases.get(current) {
        if !seen.insert(current) {
            break;
        }
        current = next;
    }

    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_canonical_id_unchanged() {
        let map = aliases(&[("claude", "anthropic/claude-sonnet")]);
        assert_eq!(
            canonicalize("anthropic/claude-sonnet", &map),
            "anthropic/claude-sonnet"
        );
    }

    #[test]
    fn test_single_hop() {
        let map = aliases(&[("claude", "anthropic/claude-sonnet")]);
        assert_eq!(canonicalize("claude", &map), "anthropic/claude-sonnet");
    }

    #[test]
    fn test_three_hop_chain() {
        let map = aliases(&[("a", "b"), ("b", "c"), ("c", "anthropic/claude-opus")]);
        assert_eq!(canonicalize("a", &map), "anthropic/claude-opus");
    }

    #[test]
    fn test_self_referential_alias_terminates() {
        let map = aliases(&[("loop", "loop")]);
        assert_eq!(canonicalize("loop", &map), "loop");
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let map = aliases(&[("a", "b"), ("b", "a")]);
        // Follows a -> b -> a, detects the repeat, returns last value reached.
        assert_eq!(canonicalize("a", &map), "a");
    }

    #[test]
    fn test_empty_map() {
        let map = BTreeMap::new();
        assert_eq!(canonicalize("anything", &map), "anything");
    }
}
