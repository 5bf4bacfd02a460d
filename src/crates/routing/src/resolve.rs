//! Top-level route resolution
//!
//! Ties the components together over an immutable configuration snapshot:
//! constraint evaluation and stage planning read the same label set, the
//! expander turns the planned stages into the primary/fallback chain, and
//! everything is collected into a single serializable `Resolution`.
//!
//! Resolution is pure and synchronous. Repeated invocation with identical
//! configuration and labels yields byte-identical output ordering, so
//! concurrent resolutions need no coordination.

use crate::alias::canonicalize;
use crate::constraint::evaluate_constraints;
use crate::expand::{expand_candidates, BlockedCandidate, CallerConstraints, StagePlanEntry};
use crate::labels::LabelSet;
use crate::policy::schema::Policy;
use crate::stage::plan_stages;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Optional caller-side filtering for one resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Availability allow-list. Entries may be aliases; they are
    /// canonicalized before use. Empty means no availability filtering.
    pub available_models: Vec<String>,
    /// Extra banned identifier prefixes, unioned with policy bans.
    pub deny_prefixes: Vec<String>,
}

/// Structured result of one resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// Final normalized label set.
    pub labels: LabelSet,
    /// Matching route rule identifiers, in evaluation order.
    pub matched_rules: Vec<String>,
    /// Matching constraint identifiers, in declared order.
    pub matched_constraints: Vec<String>,
    /// Sorted, deduplicated union of banned providers.
    pub blocked_providers: Vec<String>,
    /// Sorted, deduplicated union of banned prefixes, caller denies included.
    pub blocked_model_prefixes: Vec<String>,
    /// First surviving candidate, or `None` for an empty route.
    pub primary: Option<String>,
    /// Remaining survivors, in order.
    pub fallbacks: Vec<String>,
    /// Per-stage candidate plan, including missing-slot warnings.
    pub stage_plan: Vec<StagePlanEntry>,
    /// Rejected candidates with identifier, reason and stage.
    pub blocked_models: Vec<BlockedCandidate>,
    /// Human-readable notes from matching constraints and rules.
    pub notes: Vec<String>,
}

impl Resolution {
    /// Whether no candidate survived filtering.
    ///
    /// A distinguished, non-fatal outcome: callers decide whether to treat
    /// it as a hard failure.
    pub fn is_empty_route(&self) -> bool {
        self.primary.is_none()
    }
}

/// Resolve a label set against a policy and alias snapshot.
pub fn resolve(
    policy: &Policy,
    aliases: &BTreeMap<String, String>,
    labels: LabelSet,
    options: &ResolveOptions,
) -> Resolution {
    let ctx = evaluate_constraints(&policy.constraints, &labels);
    let plan = plan_stages(&policy.route_rules, &labels);

    let caller = CallerConstraints {
        available_models: options
            .available_models
            .iter()
            .map(|id| canonicalize(id, aliases))
            .collect(),
        deny_prefixes: options.deny_prefixes.clone(),
    };

    let expansion = expand_candidates(policy, aliases, &plan.stages, &ctx, &caller);

    let blocked_providers = sorted_unique(ctx.ban_providers.iter().cloned());
    let blocked_model_prefixes = sorted_unique(
        ctx.ban_model_prefixes
            .iter()
            .chain(options.deny_prefixes.iter())
            .cloned(),
    );

    let mut notes = ctx.notes;
    notes.extend(plan.notes);

    info!(
        primary = expansion.primary.as_deref().unwrap_or("<none>"),
        matched_rules = plan.matched_rules.len(),
        blocked = expansion.blocked.len(),
        "route resolved"
    );

    Resolution {
        labels,
        matched_rules: plan.matched_rules,
        matched_constraints: ctx.matched,
        blocked_providers,
        blocked_model_prefixes,
        primary: expansion.primary,
        fallbacks: expansion.fallbacks,
        stage_plan: expansion.stage_plan,
        blocked_models: expansion.blocked,
        notes,
    }
}

fn sorted_unique<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let set: BTreeSet<String> = values.into_iter().collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(json: serde_json::Value) -> Policy {
        serde_json::from_value(json).unwrap()
    }

    fn labels(pairs: &[(&str, &str)]) -> LabelSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_available_models_are_canonicalized() {
        let policy = policy(serde_json::json!({
            "slots": {"pool": {"candidates": ["acme/large", "other/small"]}},
            "route_rules": [{"id": "r", "priority": 10, "stages": [{"slot": "pool"}]}]
        }));
        let aliases: BTreeMap<String, String> =
            [("big".to_string(), "acme/large".to_string())]
                .into_iter()
                .collect();

        // Caller passes the alias; the allow-list must still admit the
        // canonical identifier.
        let options = ResolveOptions {
            available_models: vec!["big".to_string()],
            deny_prefixes: Vec::new(),
        };
        let result = resolve(&policy, &aliases, labels(&[]), &options);
        assert_eq!(result.primary.as_deref(), Some("acme/large"));
        assert_eq!(result.blocked_models[0].model, "other/small");
    }

    #[test]
    fn test_blocked_prefix_union_includes_caller_denies() {
        let policy = policy(serde_json::json!({
            "constraints": [
                {"id": "c", "ban_model_prefixes": ["x/"]}
            ],
            "slots": {},
            "route_rules": []
        }));
        let options = ResolveOptions {
            available_models: Vec::new(),
            deny_prefixes: vec!["y/".to_string(), "x/".to_string()],
        };
        let result = resolve(&policy, &BTreeMap::new(), labels(&[]), &options);
        assert_eq!(result.blocked_model_prefixes, vec!["x/", "y/"]);
    }

    #[test]
    fn test_empty_route_status() {
        let policy = policy(serde_json::json!({
            "slots": {"pool": {"candidates": []}},
            "route_rules": [
                {"id": "never", "when": {"scene": "private"}, "stages": [{"slot": "pool"}]}
            ]
        }));
        let result = resolve(
            &policy,
            &BTreeMap::new(),
            labels(&[("scene", "work")]),
            &ResolveOptions::default(),
        );
        assert!(result.is_empty_route());
        assert!(result.fallbacks.is_empty());
        assert!(result.stage_plan.is_empty());
    }

    #[test]
    fn test_notes_combine_constraint_reasons_then_rule_notes() {
        let policy = policy(serde_json::json!({
            "constraints": [
                {"id": "c", "reason": "constraint reason"}
            ],
            "slots": {"pool": {"candidates": ["a/one"]}},
            "route_rules": [
                {"id": "r", "priority": 10, "stages": [{"slot": "pool"}], "notes": ["rule note"]}
            ]
        }));
        let result = resolve(
            &policy,
            &BTreeMap::new(),
            labels(&[]),
            &ResolveOptions::default(),
        );
        assert_eq!(result.notes, vec!["constraint reason", "rule note"]);
    }
}
