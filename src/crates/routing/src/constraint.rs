//! Constraint evaluation
//!
//! Iterates constraints in declared order (constraints have no priority)
//! and accumulates every matching constraint's directives into one
//! filtering context. Accumulation is a union: later constraints never
//! override earlier ones.

use crate::labels::LabelSet;
use crate::policy::schema::Constraint;
use tracing::debug;

/// Accumulated filtering context from all matching constraints.
#[derive(Debug, Clone, Default)]
pub struct ConstraintContext {
    /// Providers whose candidates are blocked.
    pub ban_providers: Vec<String>,
    /// Identifier prefixes that block candidates (case-sensitive).
    pub ban_model_prefixes: Vec<String>,
    /// Providers whose candidates are stably reordered to the front.
    pub prefer_providers: Vec<String>,
    /// Human-readable reasons from matching constraints.
    pub notes: Vec<String>,
    /// Identifiers of matching constraints, in declared order.
    pub matched: Vec<String>,
}

impl ConstraintContext {
    /// Reason a candidate is blocked, or `None` when it survives.
    ///
    /// Checks banned providers, then banned prefixes, then caller-supplied
    /// deny prefixes (always unioned in, never removable by policy).
    pub fn block_reason(
        &self,
        model_id: &str,
        provider: &str,
        extra_deny_prefixes: &[String],
    ) -> Option<String> {
        for banned in &self.ban_providers {
            if provider == banned {
                return Some(format!("provider:{}", banned));
            }
        }
        for prefix in &self.ban_model_prefixes {
            if model_id.starts_with(prefix.as_str()) {
                return Some(format!("prefix:{}", prefix));
            }
        }
        for prefix in extra_deny_prefixes {
            if model_id.starts_with(prefix.as_str()) {
                return Some(format!("cli_prefix:{}", prefix));
            }
        }
        None
    }

    /// Whether a provider is in the preferred set.
    pub fn prefers(&self, provider: &str) -> bool {
        self.prefer_providers.iter().any(|p| p == provider)
    }
}

/// Evaluate all constraints against a label set.
///
/// Every matching constraint contributes; evaluation never short-circuits.
pub fn evaluate_constraints(constraints: &[Constraint], labels: &LabelSet) -> ConstraintContext {
    let mut ctx = ConstraintContext::default();

    for constraint in constraints {
        if !constraint.matcher.matches(labels) {
            continue;
        }
        debug!(id = %constraint.id, "constraint matched");
        ctx.matched.push(constraint.id.clone());
        ctx.ban_providers
            .extend(constraint.ban_providers.iter().cloned());
        ctx.ban_model_prefixes
            .extend(constraint.ban_model_prefixes.iter().cloned());
        ctx.prefer_providers
            .extend(constraint.prefer_providers.iter().cloned());
        if let Some(reason) = &constraint.reason {
            ctx.notes.push(reason.clone());
        }
    }

    ctx
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

    fn constraints(json: serde_json::Value) -> Vec<Constraint> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_matching_constraints_accumulate() {
        let all = constraints(serde_json::json!([
            {
                "id": "ban_x",
                "when": {"sensitivity": "high"},
                "ban_providers": ["provider_x"],
                "reason": "provider x is out for high sensitivity"
            },
            {
                "id": "ban_y_prefix",
                "when": {"sensitivity": "high"},
                "ban_model_prefixes": ["y/"]
            },
            {
                "id": "unrelated",
                "when": {"scene": "private"},
                "ban_providers": ["provider_z"]
            }
        ]));

        let ctx = evaluate_constraints(&all, &labels(&[("sensitivity", "high")]));
        assert_eq!(ctx.matched, vec!["ban_x", "ban_y_prefix"]);
        assert_eq!(ctx.ban_providers, vec!["provider_x"]);
        assert_eq!(ctx.ban_model_prefixes, vec!["y/"]);
        assert_eq!(ctx.notes.len(), 1);
    }

    #[test]
    fn test_block_reason_provider() {
        let ctx = ConstraintContext {
            ban_providers: vec!["blocked_co".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ctx.block_reason("blocked_co/modelA", "blocked_co", &[]),
            Some("provider:blocked_co".to_string())
        );
        assert_eq!(ctx.block_reason("goodco/modelB", "goodco", &[]), None);
    }

    #[test]
    fn test_block_reason_prefix_is_case_sensitive() {
        let ctx = ConstraintContext {
            ban_model_prefixes: vec!["Y/".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ctx.block_reason("Y/model", "y", &[]),
            Some("prefix:Y/".to_string())
        );
        assert_eq!(ctx.block_reason("y/model", "y", &[]), None);
    }

    #[test]
    fn test_caller_deny_prefixes_always_apply() {
        let ctx = ConstraintContext::default();
        assert_eq!(
            ctx.block_reason("acme/large", "acme", &["acme/".to_string()]),
            Some("cli_prefix:acme/".to_string())
        );
    }

    #[test]
    fn test_prefers() {
        let ctx = ConstraintContext {
            prefer_providers: vec!["p".to_string()],
            ..Default::default()
        };
        assert!(ctx.prefers("p"));
        assert!(!ctx.prefers("q"));
    }
}
