//! Candidate expansion
//!
//! Expands the planned stages into the final candidate chain: each stage's
//! slot candidates are canonicalized, filtered by the constraint context,
//! caller deny prefixes and the availability allow-list, reordered by
//! provider preference (stable partition), then flattened across stages
//! and deduplicated globally by canonical identifier.
//!
//! A stage referencing an unknown slot contributes zero candidates plus a
//! warning marker, never an error.

use crate::alias::canonicalize;
use crate::constraint::ConstraintContext;
use crate::policy::schema::{Policy, Stage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::warn;

/// Per-stage outcome in the resolution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlanEntry {
    /// Stage display name.
    pub stage: String,
    /// Slot the stage drew from.
    pub slot: String,
    /// Retained candidates, in final stage order.
    pub candidates: Vec<String>,
    /// `missing_slot` when the slot was not found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A candidate rejected during expansion, with full context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedCandidate {
    pub model: String,
    pub reason: String,
    pub stage: String,
}

/// Caller-supplied filtering, combined with (never overridden by) policy.
#[derive(Debug, Clone, Default)]
pub struct CallerConstraints {
    /// Canonical identifiers; when non-empty, candidates must be members.
    pub available_models: BTreeSet<String>,
    /// Extra banned identifier prefixes.
    pub deny_prefixes: Vec<String>,
}

/// Result of expanding all stages.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub stage_plan: Vec<StagePlanEntry>,
    pub primary: Option<String>,
    pub fallbacks: Vec<String>,
    pub blocked: Vec<BlockedCandidate>,
}

/// Expand stages into the final ordered candidate chain.
pub fn expand_candidates(
    policy: &Policy,
    aliases: &BTreeMap<String, String>,
    stages: &[Stage],
    ctx: &ConstraintContext,
    caller: &CallerConstraints,
) -> Expansion {
    let enforce_available = !caller.available_models.is_empty();
    let mut expansion = Expansion::default();
    let mut flattened: Vec<String> = Vec::new();

    for stage in stages {
        let slot = match policy.slots.get(&stage.slot) {
            Some(slot) => slot,
            None => {
                warn!(slot = %stage.slot, stage = %stage.name, "stage references unknown slot");
                expansion.stage_plan.push(StagePlanEntry {
                    stage: stage.name.clone(),
                    slot: stage.slot.clone(),
                    candidates: Vec::new(),
                    warning: Some("missing_slot".to_string()),
                });
                continue;
            }
        };

        let mut kept: Vec<String> = Vec::new();
        for raw in &slot.candidates {
            let model_id = canonicalize(raw, aliases);
            let provider = policy.provider_of(&model_id);

            if let Some(reason) = ctx.block_reason(&model_id, &provider, &caller.deny_prefixes) {
                expansion.blocked.push(BlockedCandidate {
                    model: model_id,
                    reason,
                    stage: stage.name.clone(),
                });
                continue;
            }
            if enforce_available && !caller.available_models.contains(&model_id) {
                expansion.blocked.push(BlockedCandidate {
                    model: model_id,
                    reason: "not_in_available_set".to_string(),
                    stage: stage.name.clone(),
                });
                continue;
            }
            kept.push(model_id);
        }

        if !ctx.prefer_providers.is_empty() {
            kept = prefer_first(kept, policy, ctx);
        }

        flattened.extend(kept.iter().cloned());
        expansion.stage_plan.push(StagePlanEntry {
            stage: stage.name.clone(),
            slot: stage.slot.clone(),
            candidates: kept,
            warning: None,
        });
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped: Vec<String> = Vec::new();
    for model in flattened {
        if seen.insert(model.clone()) {
            deduped.push(model);
        }
    }

    let mut chain = deduped.into_iter();
    expansion.primary = chain.next();
    expansion.fallbacks = chain.collect();
    expansion
}

/// Stable partition: preferred-provider candidates first, relative order
/// preserved within each partition. Not a comparator sort.
fn prefer_first(kept: Vec<String>, policy: &Policy, ctx: &ConstraintContext) -> Vec<String> {
    let (mut preferred, rest): (Vec<String>, Vec<String>) = kept
        .into_iter()
        .partition(|model| ctx.prefers(&policy.provider_of(model)));
    preferred.extend(rest);
    preferred
}
