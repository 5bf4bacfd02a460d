//! Stage planning
//!
//! Turns the matching route rules into an ordered stage list. Rules are
//! processed in ascending priority (stable sort, ties keep declaration
//! order); a matching rule's full stage list replaces the working list
//! (last writer wins), and its augmentations then apply immediately in the
//! rule's own order. Augmentations from earlier rules are not reapplied
//! after a later rule resets the base list. The final list is deduplicated
//! by (name, slot) identity, first occurrence wins.

use crate::labels::LabelSet;
use crate::policy::schema::{Position, RouteRule, Stage};
use std::collections::HashSet;
use tracing::debug;

/// Outcome of stage planning.
#[derive(Debug, Clone, Default)]
pub struct StagePlan {
    /// Final ordered, deduplicated stage list.
    pub stages: Vec<Stage>,
    /// Identifiers of matching rules, in evaluation order.
    pub matched_rules: Vec<String>,
    /// Notes accumulated from matching rules.
    pub notes: Vec<String>,
}

/// Plan the stage list for a label set.
pub fn plan_stages(rules: &[RouteRule], labels: &LabelSet) -> StagePlan {
    let mut ordered: Vec<&RouteRule> = rules.iter().collect();
    // sort_by_key is stable: equal priorities keep declaration order.
    ordered.sort_by_key(|rule| rule.priority);

    let mut plan = StagePlan::default();

    for rule in ordered {
        if !rule.matcher.matches(labels) {
            continue;
        }
        debug!(id = %rule.id, priority = rule.priority, "route rule matched");
        plan.matched_rules.push(rule.id.clone());

        if let Some(stages) = &rule.stages {
            // Last matching rule with a full stage list wins the base.
            plan.stages = stages.clone();
        }
        for aug in &rule.augment_stages {
            match aug.position {
                Position::Prepend => plan.stages.insert(0, aug.stage.clone()),
                Position::Append => plan.stages.push(aug.stage.clone()),
            }
        }
        plan.notes.extend(rule.notes.iter().cloned());
    }

    plan.stages = dedupe_stages(plan.stages);
    plan
}

/// Drop later duplicates keyed by (name, slot), preserving first occurrence.
fn dedupe_stages(stages: Vec<Stage>) -> Vec<Stage> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut out = Vec::with_capacity(stages.len());
    for stage in stages {
        if seen.insert((stage.name.clone(), stage.slot.clone())) {
            out.push(stage);
        }
    }
    out
}
