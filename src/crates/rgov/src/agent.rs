//! Downstream agent selection and command construction
//!
//! After the model route is resolved, a second, smaller rules document
//! picks which external agent should carry the request and at what
//! thinking level, then the invocation command for the external agent tool
//! is assembled. The engine's generic matcher drives the rules; unlike
//! route rules, agent rules are first-match-wins.

use routing::{LabelSet, MatchSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Agent routing document: defaults plus priority-ordered rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRouting {
    #[serde(default)]
    pub defaults: AgentDefaults,

    #[serde(default)]
    pub rules: Vec<AgentRule>,
}

/// Fallback agent and thinking-level tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefaults {
    /// External tool executable the command is built for.
    #[serde(default = "default_command")]
    pub command: String,

    /// Agent used when no rule matches.
    #[serde(default = "default_agent")]
    pub agent: String,

    /// Thinking level by `value` label (checked first).
    #[serde(default)]
    pub thinking_by_value: BTreeMap<String, String>,

    /// Thinking level by `complexity` label (checked second).
    #[serde(default)]
    pub thinking_by_complexity: BTreeMap<String, String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            command: default_command(),
            agent: default_agent(),
            thinking_by_value: BTreeMap::new(),
            thinking_by_complexity: BTreeMap::new(),
        }
    }
}

/// One agent-selection rule. First matching rule (ascending priority,
/// declaration order on ties) wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRule {
    #[serde(default = "default_rule_id")]
    pub id: String,

    #[serde(default = "default_priority")]
    pub priority: i64,

    #[serde(flatten)]
    pub matcher: MatchSpec,

    pub agent: String,

    #[serde(default)]
    pub notes: Vec<String>,
}

/// Chosen agent with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPick {
    pub agent: String,
    pub matched_rule: Option<String>,
    pub notes: Vec<String>,
}

/// Pick the agent for a label set.
pub fn pick_agent(cfg: &AgentRouting, labels: &LabelSet) -> AgentPick {
    let mut ordered: Vec<&AgentRule> = cfg.rules.iter().collect();
    ordered.sort_by_key(|rule| rule.priority);

    for rule in ordered {
        if rule.matcher.matches(labels) {
            return AgentPick {
                agent: rule.agent.clone(),
                matched_rule: Some(rule.id.clone()),
                notes: rule.notes.clone(),
            };
        }
    }

    AgentPick {
        agent: cfg.defaults.agent.clone(),
        matched_rule: None,
        notes: Vec::new(),
    }
}

/// Pick the thinking level: explicit override, else by `value` label, else
/// by `complexity` label, else none.
pub fn pick_thinking(
    cfg: &AgentRouting,
    labels: &LabelSet,
    override_level: Option<&str>,
) -> Option<String> {
    if let Some(level) = override_level {
        return Some(level.to_string());
    }
    if let Some(value) = labels.get("value") {
        if let Some(level) = cfg.defaults.thinking_by_value.get(value) {
            return Some(level.clone());
        }
    }
    if let Some(complexity) = labels.get("complexity") {
        if let Some(level) = cfg.defaults.thinking_by_complexity.get(complexity) {
            return Some(level.clone());
        }
    }
    None
}

/// Delivery options forwarded to the external agent tool.
#[derive(Debug, Clone, Default)]
pub struct AgentCommandOptions {
    pub message: Option<String>,
    pub to: Option<String>,
    pub session_id: Option<String>,
    pub local: bool,
    pub deliver: bool,
    pub json_output: bool,
    pub thinking: Option<String>,
    pub timeout: Option<u64>,
}

/// Build the argv for the external agent tool.
pub fn build_agent_command(
    cfg: &AgentRouting,
    agent: &str,
    opts: &AgentCommandOptions,
) -> Vec<String> {
    let mut cmd = vec![
        cfg.defaults.command.clone(),
        "agent".to_string(),
        "--agent".to_string(),
        agent.to_string(),
    ];
    if let Some(message) = &opts.message {
        cmd.push("--message".to_string());
        cmd.push(message.clone());
    }
    if let Some(to) = &opts.to {
        cmd.push("--to".to_string());
        cmd.push(to.clone());
    }
    if let Some(session_id) = &opts.session_id {
        cmd.push("--session-id".to_string());
        cmd.push(session_id.clone());
    }
    if opts.local {
        cmd.push("--local".to_string());
    }
    if opts.deliver {
        cmd.push("--deliver".to_string());
    }
    if opts.json_output {
        cmd.push("--json".to_string());
    }
    if let Some(thinking) = &opts.thinking {
        cmd.push("--thinking".to_string());
        cmd.push(thinking.clone());
    }
    if let Some(timeout) = opts.timeout {
        cmd.push("--timeout".to_string());
        cmd.push(timeout.to_string());
    }
    cmd
}

fn default_command() -> String {
    "openclaw".to_string()
}

fn default_agent() -> String {
    "annie".to_string()
}

fn default_rule_id() -> String {
    "unnamed_rule".to_string()
}

fn default_priority() -> i64 {
    1000
}
