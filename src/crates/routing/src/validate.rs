//! Offline structural validation
//!
//! Configuration hygiene checks that are deliberately kept off the
//! resolution hot path: the resolver degrades gracefully at runtime
//! (a missing slot becomes a warning, an alias cycle stops the walk)
//! while this validator reports the underlying policy defects for a human
//! to fix.

use crate::policy::schema::Policy;
use std::collections::{BTreeMap, HashSet};

/// Validate a policy and alias map, returning every issue found.
///
/// An empty result means the documents are structurally sound. Issues are
/// messages, not errors: the caller decides how to report them.
pub fn validate(policy: &Policy, aliases: &BTreeMap<String, String>) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    // Slot candidates must resolve to known models. A single alias hop is
    // allowed here; chains deeper than one hop are themselves a hygiene
    // problem surfaced by the unknown-model message.
    for (slot_id, slot) in &policy.slots {
        for candidate in &slot.candidates {
            let target = aliases.get(candidate).unwrap_or(candidate);
            if !policy.models.contains_key(target) {
                errors.push(format!(
                    "Slot {} candidate {:?} resolves to unknown model {:?}",
                    slot_id, candidate, target
                ));
            }
        }
    }

    for rule in &policy.route_rules {
        if rule.stages.is_none() && rule.augment_stages.is_empty() {
            errors.push(format!(
                "Rule {} must contain 'stages' or 'augment_stages'",
                rule.id
            ));
        }
        let rule_stages = rule
            .stages
            .iter()
            .flatten()
            .chain(rule.augment_stages.iter().map(|aug| &aug.stage));
        for stage in rule_stages {
            if !policy.slots.contains_key(&stage.slot) {
                errors.push(format!(
                    "Rule {} references unknown slot {:?}",
                    rule.id, stage.slot
                ));
            }
        }
    }

    // Full alias cycle detection lives here, not in the resolver.
    for src in aliases.keys() {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = src.as_str();
        while let Some(next) = aliases.get(current) {
            if !seen.insert(current) {
                errors.push(format!("Alias cycle detected starting at {:?}", src));
                break;
            }
            current = next;
        }
    }

    errors
}
