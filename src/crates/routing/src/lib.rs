//! # Routing - Label-Driven Model Routing Policy Engine
//!
//! Resolves a request's metadata labels (scene, sensitivity, task type,
//! value tier, ...) into an ordered, deduplicated chain of candidate
//! execution targets: a primary choice plus ranked fallbacks. Routing
//! behavior lives entirely in declarative JSON policy and alias documents,
//! so operational decisions change by editing data, never code.
//!
//! ## Pipeline
//!
//! - **Label Normalizer** - merges defaults, raw overrides and explicit
//!   overrides into one flat string-keyed label set
//! - **Rule Matcher** - one generic condition matcher shared by route
//!   rules and constraints
//! - **Constraint Evaluator** - accumulates ban/prefer directives from
//!   every matching constraint
//! - **Stage Planner** - priority-ordered rule application producing an
//!   ordered, deduplicated stage list
//! - **Candidate Expander** - alias canonicalization, filtering,
//!   preference reordering and global dedup into primary + fallbacks
//!
//! The engine is pure and synchronous: every resolution is a read-only
//! pass over an immutable configuration snapshot, producing a fresh,
//! deterministic result.
//!
//! ## Quick Start
//!
//! ```rust
//! use routing::{merge_labels, resolve, Policy, ResolveOptions};
//! use std::collections::BTreeMap;
//!
//! let policy: Policy = serde_json::from_str(r#"{
//!     "defaults": {"scene": "work"},
//!     "slots": {"general": {"candidates": ["acme/large", "other/small"]}},
//!     "route_rules": [
//!         {"id": "default", "priority": 100, "stages": [{"slot": "general"}]}
//!     ]
//! }"#).unwrap();
//!
//! let aliases = BTreeMap::new();
//! let labels = merge_labels(&policy.defaults, None, &[]);
//! let result = resolve(&policy, &aliases, labels, &ResolveOptions::default());
//!
//! assert_eq!(result.primary.as_deref(), Some("acme/large"));
//! assert_eq!(result.fallbacks, vec!["other/small"]);
//! ```

// Core modules
pub mod alias;
pub mod constraint;
pub mod expand;
pub mod labels;
pub mod matcher;
pub mod policy;
pub mod resolve;
pub mod stage;
pub mod validate;

// Error types and utilities
mod error;

// Re-export key types for convenience
pub use alias::canonicalize;
pub use constraint::{evaluate_constraints, ConstraintContext};
pub use expand::{expand_candidates, BlockedCandidate, CallerConstraints, StagePlanEntry};
pub use labels::{merge_labels, stringify, LabelSet, LABEL_KEYS};
pub use matcher::{condition_matches, Condition, Expected, MatchSpec};
pub use policy::{load_aliases, load_policy, AliasDocument, Policy};
pub use resolve::{resolve, Resolution, ResolveOptions};
pub use stage::{plan_stages, StagePlan};
pub use validate::validate;

// Error types
pub use error::{Result, RoutingError};
