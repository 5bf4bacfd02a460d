//! Policy and alias document schema
//!
//! All routing behavior is data: a policy document carries `defaults`,
//! `models`, `slots`, `constraints` and `route_rules`; a separate alias
//! document carries one `aliases` mapping. Everything deserializes into
//! owned, immutable structs that the engine treats as a read-only snapshot
//! for the duration of a resolution.

use crate::matcher::MatchSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level routing policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    /// Policy-wide default labels, merged below caller labels.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Canonical model identifier -> metadata.
    #[serde(default)]
    pub models: BTreeMap<String, ModelRecord>,

    /// Named candidate pools referenced by stages.
    #[serde(default)]
    pub slots: BTreeMap<String, Slot>,

    /// Ban/prefer constraints, evaluated in declared order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// Route rules, evaluated in ascending priority order.
    #[serde(default)]
    pub route_rules: Vec<RouteRule>,
}

impl Policy {
    /// Provider of a canonical model identifier.
    ///
    /// Uses the model record's `provider` field when present, otherwise the
    /// identifier text before the first `/` (the whole identifier when
    /// there is no separator).
    pub fn provider_of(&self, model_id: &str) -> String {
        if let Some(provider) = self.models.get(model_id).and_then(|m| m.provider.as_deref()) {
            return provider.to_string();
        }
        model_id.split('/').next().unwrap_or(model_id).to_string()
    }
}

/// Metadata for one canonical model identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Provider name; derived from the identifier when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Unmodeled metadata, carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A named pool of raw candidate identifiers (possibly aliases).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub candidates: Vec<String>,
}

/// A ban/prefer rule. Constraints never select stages; every matching
/// constraint's directives accumulate into one filtering context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default = "default_constraint_id")]
    pub id: String,

    #[serde(flatten)]
    pub matcher: MatchSpec,

    /// Providers whose candidates are blocked outright.
    #[serde(default)]
    pub ban_providers: Vec<String>,

    /// Case-sensitive identifier prefixes that block candidates.
    #[serde(default)]
    pub ban_model_prefixes: Vec<String>,

    /// Providers whose candidates sort ahead within each stage.
    #[serde(default)]
    pub prefer_providers: Vec<String>,

    /// Human-readable reason, surfaced in resolution notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A stage-selecting rule. Matching rules are applied in ascending
/// priority order; a matching rule's full `stages` list replaces the
/// working list (last writer wins), then its `augment_stages` apply in
/// declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    #[serde(default = "default_rule_id")]
    pub id: String,

    /// Lower values are evaluated first. Ties keep declaration order.
    #[serde(default = "default_priority")]
    pub priority: i64,

    #[serde(flatten)]
    pub matcher: MatchSpec,

    /// Full stage list; replaces any prior stage list when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,

    /// Cumulative stage insertions applied after the base list.
    #[serde(default)]
    pub augment_stages: Vec<StageAugmentation>,

    /// Free-form notes, surfaced in resolution notes.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// A named reference to a slot within the resolution plan.
///
/// `(name, slot)` is the deduplication identity: two stages with the same
/// name and slot are the same stage even when introduced by different
/// rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub slot: String,

    #[serde(default = "default_stage_name")]
    pub name: String,
}

/// A stage insertion attached to a route rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageAugmentation {
    #[serde(default)]
    pub position: Position,

    #[serde(flatten)]
    pub stage: Stage,
}

/// Where an augmentation inserts its stage into the working list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Insert at the front of the current working list.
    Prepend,
    /// Add to the back (default).
    Append,
}

impl Default for Position {
    fn default() -> Self {
        Self::Append
    }
}

/// The alias document: a single identifier -> identifier mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasDocument {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_constraint_id() -> String {
    "unnamed_constraint".to_string()
}

fn default_rule_id() -> String {
    "unnamed_rule".to_string()
}

fn default_stage_name() -> String {
    "primary".to_string()
}

fn default_priority() -> i64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_deserialization() {
        let json = r#"{
            "defaults": {"scene": "work"},
            "models": {
                "acme/large": {"provider": "acme", "context_window": 200000}
            },
            "slots": {
                "general": {"candidates": ["acme/large", "other/small"]}
            },
            "constraints": [
                {
                    "id": "no_acme",
                    "when": {"privacy_requirement": "strict"},
                    "ban_providers": ["acme"],
                    "reason": "strict privacy excludes acme"
                }
            ],
            "route_rules": [
                {
                    "id": "general_route",
                    "priority": 50,
                    "when": {"scene": "work"},
                    "stages": [{"slot": "general"}]
                }
            ]
        }"#;

        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.defaults.get("scene").unwrap(), "work");
        assert_eq!(policy.slots["general"].candidates.len(), 2);
        assert_eq!(policy.constraints[0].id, "no_acme");
        assert_eq!(policy.route_rules[0].priority, 50);
        assert_eq!(
            policy.route_rules[0].stages.as_ref().unwrap()[0].name,
            "primary"
        );
    }

    #[test]
    fn test_rule_defaults() {
        let rule: RouteRule = serde_json::from_str(r#"{"stages": [{"slot": "x"}]}"#).unwrap();
        assert_eq!(rule.id, "unnamed_rule");
        assert_eq!(rule.priority, 1000);
        assert!(rule.augment_stages.is_empty());
    }

    #[test]
    fn test_augmentation_position_default() {
        let aug: StageAugmentation = serde_json::from_str(r#"{"slot": "extra"}"#).unwrap();
        assert_eq!(aug.position, Position::Append);
        assert_eq!(aug.stage.name, "primary");

        let aug: StageAugmentation =
            serde_json::from_str(r#"{"slot": "extra", "position": "prepend", "name": "boost"}"#)
                .unwrap();
        assert_eq!(aug.position, Position::Prepend);
        assert_eq!(aug.stage.name, "boost");
    }

    #[test]
    fn test_provider_of_prefers_record() {
        let policy: Policy = serde_json::from_str(
            r#"{"models": {"hosted/model-a": {"provider": "custom_provider"}}}"#,
        )
        .unwrap();
        assert_eq!(policy.provider_of("hosted/model-a"), "custom_provider");
    }

    #[test]
    fn test_provider_of_derives_from_identifier() {
        let policy = Policy::default();
        assert_eq!(policy.provider_of("acme/large"), "acme");
        assert_eq!(policy.provider_of("acme/family/large"), "acme");
        assert_eq!(policy.provider_of("bare-model"), "bare-model");
    }

    #[test]
    fn test_alias_document() {
        let doc: AliasDocument =
            serde_json::from_str(r#"{"aliases": {"claude": "anthropic/claude-sonnet"}}"#).unwrap();
        assert_eq!(doc.aliases["claude"], "anthropic/claude-sonnet");

        let empty: AliasDocument = serde_json::from_str("{}").unwrap();
        assert!(empty.aliases.is_empty());
    }
}
