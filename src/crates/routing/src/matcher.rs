//! Generic condition matching over label sets
//!
//! Route rules and constraints share one matcher: a `Condition` maps label
//! keys to an expected value (single string or match-any-of set), and a
//! `MatchSpec` combines an optional `when` conjunction with an optional
//! `when_any` disjunction. Rules stay tagged records consumed by this one
//! function; there is no per-rule-type dispatch.

use crate::labels::LabelSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expected value(s) for a single condition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    /// The label must equal this exact string.
    One(String),
    /// The label must be a member of this set.
    AnyOf(Vec<String>),
}

impl Expected {
    fn satisfied_by(&self, actual: &str) -> bool {
        match self {
            Expected::One(value) => actual == value,
            Expected::AnyOf(values) => values.iter().any(|v| v == actual),
        }
    }
}

/// Mapping from label key to expected value(s).
pub type Condition = BTreeMap<String, Expected>;

/// Check a condition against a label set.
///
/// Matches iff every key in the condition is present in the label set with
/// a satisfying value. Absent keys always fail; an empty condition matches
/// unconditionally.
pub fn condition_matches(labels: &LabelSet, condition: &Condition) -> bool {
    condition.iter().all(|(key, expected)| {
        labels
            .get(key)
            .map_or(false, |actual| expected.satisfied_by(actual))
    })
}

/// Match clause shared by route rules and constraints.
///
/// - `when` present: the condition must match.
/// - `when_any` present: at least one sub-condition must match.
/// - Both present: both requirements must hold.
/// - Neither present: matches unconditionally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_any: Option<Vec<Condition>>,
}

impl MatchSpec {
    /// Evaluate this match clause against a label set.
    pub fn matches(&self, labels: &LabelSet) -> bool {
        if let Some(when) = &self.when {
            if !condition_matches(labels, when) {
                return false;
            }
        }
        if let Some(when_any) = &self.when_any {
            if !when_any.iter().any(|cond| condition_matches(labels, cond)) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> LabelSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn condition(json: serde_json::Value) -> Condition {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let cond = condition(serde_json::json!({"scene": "work"}));
        assert!(condition_matches(&labels(&[("scene", "work")]), &cond));
        assert!(!condition_matches(&labels(&[("scene", "private")]), &cond));
    }

    #[test]
    fn test_any_of_match() {
        let cond = condition(serde_json::json!({"sensitivity": ["high", "intimate"]}));
        assert!(condition_matches(&labels(&[("sensitivity", "intimate")]), &cond));
        assert!(!condition_matches(&labels(&[("sensitivity", "normal")]), &cond));
    }

    #[test]
    fn test_absent_key_fails() {
        let cond = condition(serde_json::json!({"task_type": "coding"}));
        assert!(!condition_matches(&labels(&[("scene", "work")]), &cond));
    }

    #[test]
    fn test_empty_condition_matches() {
        let cond = Condition::new();
        assert!(condition_matches(&labels(&[]), &cond));
    }

    #[test]
    fn test_all_keys_required() {
        let cond = condition(serde_json::json!({"scene": "work", "task_type": "coding"}));
        assert!(condition_matches(
            &labels(&[("scene", "work"), ("task_type", "coding")]),
            &cond
        ));
        assert!(!condition_matches(&labels(&[("scene", "work")]), &cond));
    }

    #[test]
    fn test_match_spec_when_only() {
        let spec: MatchSpec =
            serde_json::from_value(serde_json::json!({"when": {"scene": "work"}})).unwrap();
        assert!(spec.matches(&labels(&[("scene", "work")])));
        assert!(!spec.matches(&labels(&[("scene", "private")])));
    }

    #[test]
    fn test_match_spec_when_any() {
        let spec: MatchSpec = serde_json::from_value(serde_json::json!({
            "when_any": [{"scene": "private"}, {"sensitivity": "intimate"}]
        }))
        .unwrap();
        assert!(spec.matches(&labels(&[("scene", "private")])));
        assert!(spec.matches(&labels(&[("sensitivity", "intimate")])));
        assert!(!spec.matches(&labels(&[("scene", "work")])));
    }

    #[test]
    fn test_match_spec_both_clauses() {
        let spec: MatchSpec = serde_json::from_value(serde_json::json!({
            "when": {"scene": "work"},
            "when_any": [{"task_type": "coding"}, {"task_type": "planning"}]
        }))
        .unwrap();
        assert!(spec.matches(&labels(&[("scene", "work"), ("task_type", "coding")])));
        assert!(!spec.matches(&labels(&[("scene", "work"), ("task_type", "writing")])));
        assert!(!spec.matches(&labels(&[("scene", "private"), ("task_type", "coding")])));
    }

    #[test]
    fn test_match_spec_neither_clause_matches_unconditionally() {
        let spec = MatchSpec::default();
        assert!(spec.matches(&labels(&[])));
    }

    #[test]
    fn test_empty_when_any_never_matches() {
        let spec: MatchSpec =
            serde_json::from_value(serde_json::json!({"when_any": []})).unwrap();
        assert!(!spec.matches(&labels(&[("scene", "work")])));
    }
}
