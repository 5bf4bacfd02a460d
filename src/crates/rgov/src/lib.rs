//! # rgov - Routing Governor CLI
//!
//! Thin command-line shell around the `routing` policy engine:
//!
//! - **route** - resolve labels into a primary + fallback model chain
//! - **validate** - offline structural checks on policy and alias files
//! - **smoke** - replay a batch of routing cases and check assertions
//! - **agent** - pick a downstream agent and build (or run) its command
//!
//! All routing logic lives in the `routing` crate; this crate only parses
//! arguments, loads JSON documents, and formats output.

pub mod agent;
pub mod presets;
pub mod smoke;

pub use agent::{pick_agent, pick_thinking, AgentPick, AgentRouting};
pub use presets::{format_presets, preset_labels};
pub use smoke::{run_cases, CaseResult, SmokeCases};
