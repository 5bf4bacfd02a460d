//! Batch smoke-test harness
//!
//! Replays a JSON file of routing cases through the engine in-process and
//! checks each case's assertions against the resolution fields. Failures
//! are collected per case rather than aborting the run.

use routing::{merge_labels, resolve, Policy, Resolution, ResolveOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The smoke-cases document: `{"cases": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmokeCases {
    #[serde(default)]
    pub cases: Vec<SmokeCase>,
}

/// One routing case: input labels plus expected output properties.
#[derive(Debug, Clone, Deserialize)]
pub struct SmokeCase {
    #[serde(default = "default_case_id")]
    pub id: String,

    /// Raw label overrides, merged over the policy defaults.
    #[serde(default)]
    pub labels: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub assertions: Assertions,
}

/// Supported per-case assertions. Absent fields are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Assertions {
    /// Primary must be one of these identifiers.
    pub primary_in: Option<Vec<String>>,
    /// Primary must start with one of these prefixes.
    pub primary_in_prefixes: Option<Vec<String>>,
    /// Every named provider must appear in `blocked_providers`.
    pub blocked_providers_contains: Option<Vec<String>>,
    /// No routed model may start with any of these prefixes.
    pub must_not_include_prefixes: Option<Vec<String>>,
    /// Every named slot must appear in the stage plan.
    pub stage_slots_include: Option<Vec<String>>,
    /// Every named model must appear somewhere in the route.
    pub list_includes: Option<Vec<String>>,
}

/// Outcome of one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub id: String,
    pub ok: bool,
    pub errors: Vec<String>,
    pub primary: Option<String>,
    pub stage_slots: Vec<String>,
    pub matched_rules: Vec<String>,
}

/// Run all cases against one policy/alias snapshot.
pub fn run_cases(
    policy: &Policy,
    aliases: &BTreeMap<String, String>,
    cases: &[SmokeCase],
) -> Vec<CaseResult> {
    cases
        .iter()
        .map(|case| {
            let labels = merge_labels(&policy.defaults, Some(&case.labels), &[]);
            let resolution = resolve(policy, aliases, labels, &ResolveOptions::default());
            let errors = check_case(&case.assertions, &resolution);
            debug!(case = %case.id, errors = errors.len(), "smoke case checked");
            CaseResult {
                id: case.id.clone(),
                ok: errors.is_empty(),
                errors,
                primary: resolution.primary.clone(),
                stage_slots: stage_slots(&resolution),
                matched_rules: resolution.matched_rules.clone(),
            }
        })
        .collect()
}

fn stage_slots(resolution: &Resolution) -> Vec<String> {
    resolution
        .stage_plan
        .iter()
        .map(|entry| entry.slot.clone())
        .collect()
}

fn routed_models(resolution: &Resolution) -> Vec<&str> {
    resolution
        .primary
        .iter()
        .map(String::as_str)
        .chain(resolution.fallbacks.iter().map(String::as_str))
        .collect()
}

fn check_case(assertions: &Assertions, resolution: &Resolution) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();
    let primary = resolution.primary.as_deref();
    let all_models = routed_models(resolution);
    let slots = stage_slots(resolution);

    if let Some(expected) = &assertions.primary_in {
        if !primary.map_or(false, |p| expected.iter().any(|e| e == p)) {
            errors.push(format!("primary {:?} not in primary_in", primary));
        }
    }

    if let Some(prefixes) = &assertions.primary_in_prefixes {
        let ok = primary.map_or(false, |p| prefixes.iter().any(|pre| p.starts_with(pre)));
        if !ok {
            errors.push(format!(
                "primary {:?} does not match any required prefix {:?}",
                primary, prefixes
            ));
        }
    }

    if let Some(providers) = &assertions.blocked_providers_contains {
        for provider in providers {
            if !resolution.blocked_providers.contains(provider) {
                errors.push(format!("blocked_providers missing {:?}", provider));
            }
        }
    }

    if let Some(prefixes) = &assertions.must_not_include_prefixes {
        for model in &all_models {
            for prefix in prefixes {
                if model.starts_with(prefix.as_str()) {
                    errors.push(format!(
                        "route includes forbidden model prefix {:?}: {}",
                        prefix, model
                    ));
                }
            }
        }
    }

    if let Some(expected_slots) = &assertions.stage_slots_include {
        for slot in expected_slots {
            if !slots.contains(slot) {
                errors.push(format!("stage slots missing {:?}", slot));
            }
        }
    }

    if let Some(required) = &assertions.list_includes {
        for model in required {
            if !all_models.iter().any(|m| *m == model) {
                errors.push(format!("route models missing required candidate {:?}", model));
            }
        }
    }

    errors
}

fn default_case_id() -> String {
    "unknown".to_string()
}
