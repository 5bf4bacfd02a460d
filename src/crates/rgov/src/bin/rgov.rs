//! rgov CLI - label-driven model routing governor
//!
//! Main entry point for the rgov command-line tool.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rgov::agent::{build_agent_command, pick_agent, pick_thinking, AgentCommandOptions, AgentRouting};
use rgov::presets::{format_presets, preset_labels};
use rgov::smoke::{run_cases, SmokeCases};
use routing::{load_aliases, load_policy, merge_labels, resolve, LabelSet, Policy, ResolveOptions};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit code for a resolution with no surviving primary candidate.
const EXIT_NO_ROUTE: i32 = 2;

#[derive(Parser)]
#[command(name = "rgov")]
#[command(about = "Label-driven model routing governor", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve labels into a primary model and fallback chain
    Route(RouteArgs),

    /// Validate policy and alias documents structurally
    Validate(ConfigArgs),

    /// Replay smoke-test cases against the policy
    Smoke(SmokeArgs),

    /// Pick a downstream agent and build (or run) its command
    Agent(AgentArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the routing policy JSON document
    #[arg(long, default_value = "assets/routing-policy.json")]
    policy: PathBuf,

    /// Path to the alias map JSON document
    #[arg(long, default_value = "assets/alias-map.json")]
    aliases: PathBuf,
}

/// Label flags shared by `route` and `agent`.
///
/// Merge order (later wins): policy defaults, preset, --labels-json,
/// explicit flags.
#[derive(Args)]
struct LabelArgs {
    /// Preset name providing a base label bundle
    #[arg(long)]
    preset: Option<String>,

    /// List available presets and exit
    #[arg(long)]
    list_presets: bool,

    /// JSON object with routing labels
    #[arg(long)]
    labels_json: Option<String>,

    #[arg(long)]
    scene: Option<String>,
    #[arg(long)]
    sensitivity: Option<String>,
    #[arg(long)]
    task_type: Option<String>,
    #[arg(long)]
    modality: Option<String>,
    #[arg(long)]
    complexity: Option<String>,
    #[arg(long)]
    value: Option<String>,
    #[arg(long)]
    context_size: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    latency_budget: Option<String>,
    #[arg(long)]
    cost_budget: Option<String>,
    #[arg(long)]
    privacy_requirement: Option<String>,
    #[arg(long)]
    provider_preference: Option<String>,
}

#[derive(Args)]
struct RouteArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    labels: LabelArgs,

    /// Repeatable. Only these models (canonical or alias) are allowed if provided
    #[arg(long = "available-model")]
    available_model: Vec<String>,

    /// Repeatable. Extra banned model-identifier prefixes
    #[arg(long = "deny-model-prefix")]
    deny_model_prefix: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct SmokeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Path to the smoke cases JSON document
    #[arg(long, default_value = "assets/smoke-routes.json")]
    cases: PathBuf,

    /// Run only specific case id(s)
    #[arg(long = "case-id")]
    case_id: Vec<String>,

    /// Human-readable per-case output instead of a JSON summary
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct AgentArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    labels: LabelArgs,

    /// Path to the agent routing JSON document
    #[arg(long, default_value = "assets/agent-routing.json")]
    agent_routing: PathBuf,

    /// Message text for the downstream agent
    #[arg(short, long)]
    message: Option<String>,

    /// Read the message body from stdin
    #[arg(long)]
    stdin_message: bool,

    #[arg(long)]
    to: Option<String>,

    #[arg(long)]
    session_id: Option<String>,

    #[arg(long)]
    local: bool,

    #[arg(long)]
    deliver: bool,

    /// Pass --json to the downstream agent tool
    #[arg(long)]
    json_output: bool,

    /// Thinking level override
    #[arg(long, value_parser = ["off", "minimal", "low", "medium", "high"])]
    thinking: Option<String>,

    /// Timeout in seconds for the downstream agent
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the delegated command before output
    #[arg(long)]
    show_command: bool,

    /// Execute the downstream agent (default is dry-run)
    #[arg(long)]
    run: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Route(args) => cmd_route(args),
        Commands::Validate(args) => cmd_validate(args),
        Commands::Smoke(args) => cmd_smoke(args),
        Commands::Agent(args) => cmd_agent(args),
    }
}

fn load_config(config: &ConfigArgs) -> Result<(Policy, BTreeMap<String, String>)> {
    let policy = load_policy(&config.policy)?;
    let aliases = load_aliases(&config.aliases)?;
    Ok((policy, aliases))
}

/// Build the final label set from defaults, preset, raw JSON and flags.
fn build_labels(policy: &Policy, args: &LabelArgs) -> Result<LabelSet> {
    let mut raw = serde_json::Map::new();

    if let Some(name) = &args.preset {
        let preset = preset_labels(name)
            .ok_or_else(|| anyhow!("Unknown preset: {} (use --list-presets)", name))?;
        for (key, value) in preset {
            raw.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    if let Some(json) = &args.labels_json {
        let value: serde_json::Value =
            serde_json::from_str(json).context("--labels-json is not valid JSON")?;
        let object = value
            .as_object()
            .ok_or_else(|| anyhow!("--labels-json must be a JSON object"))?;
        for (key, value) in object {
            raw.insert(key.clone(), value.clone());
        }
    }

    let explicit: Vec<(&str, Option<&str>)> = vec![
        ("scene", args.scene.as_deref()),
        ("sensitivity", args.sensitivity.as_deref()),
        ("task_type", args.task_type.as_deref()),
        ("modality", args.modality.as_deref()),
        ("complexity", args.complexity.as_deref()),
        ("value", args.value.as_deref()),
        ("context_size", args.context_size.as_deref()),
        ("language", args.language.as_deref()),
        ("latency_budget", args.latency_budget.as_deref()),
        ("cost_budget", args.cost_budget.as_deref()),
        ("privacy_requirement", args.privacy_requirement.as_deref()),
        ("provider_preference", args.provider_preference.as_deref()),
    ];

    Ok(merge_labels(&policy.defaults, Some(&raw), &explicit))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}

fn cmd_route(args: RouteArgs) -> Result<i32> {
    if args.labels.list_presets {
        println!("{}", format_presets());
        return Ok(0);
    }

    let (policy, aliases) = load_config(&args.config)?;
    let labels = build_labels(&policy, &args.labels)?;

    let options = ResolveOptions {
        available_models: args.available_model.clone(),
        deny_prefixes: args.deny_model_prefix.clone(),
    };
    let result = resolve(&policy, &aliases, labels, &options);
    print_json(&result, args.pretty)?;

    if result.is_empty_route() {
        return Ok(EXIT_NO_ROUTE);
    }
    Ok(0)
}

fn cmd_validate(args: ConfigArgs) -> Result<i32> {
    let (policy, aliases) = load_config(&args)?;
    let errors = routing::validate(&policy, &aliases);
    if errors.is_empty() {
        println!("OK: policy and alias map are structurally valid");
        return Ok(0);
    }
    for error in &errors {
        println!("ERROR: {}", error);
    }
    Ok(1)
}

fn cmd_smoke(args: SmokeArgs) -> Result<i32> {
    let (policy, aliases) = load_config(&args.config)?;

    let content = std::fs::read_to_string(&args.cases)
        .with_context(|| format!("Failed to read {}", args.cases.display()))?;
    let doc: SmokeCases = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", args.cases.display()))?;

    let mut cases = doc.cases;
    if !args.case_id.is_empty() {
        let known: Vec<&str> = cases.iter().map(|c| c.id.as_str()).collect();
        let missing: Vec<&String> = args
            .case_id
            .iter()
            .filter(|id| !known.contains(&id.as_str()))
            .collect();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
            eprintln!("ERROR: Unknown case id(s): {}", names.join(", "));
            return Ok(2);
        }
        cases.retain(|case| args.case_id.iter().any(|id| id == &case.id));
    }

    let results = run_cases(&policy, &aliases, &cases);
    let failures = results.iter().filter(|r| !r.ok).count();

    if args.pretty {
        for result in &results {
            let status = if result.ok { "PASS" } else { "FAIL" };
            println!("[{}] {}", status, result.id);
            for error in &result.errors {
                println!("  - {}", error);
            }
            println!("  primary: {}", result.primary.as_deref().unwrap_or("null"));
            println!("  matched_rules: {}", result.matched_rules.join(", "));
            println!("  stage_slots: {}", result.stage_slots.join(", "));
        }
    } else {
        let summary = serde_json::json!({
            "total": results.len(),
            "failures": failures,
            "results": results,
        });
        print_json(&summary, false)?;
    }

    if failures > 0 {
        return Ok(1);
    }
    Ok(0)
}

fn cmd_agent(mut args: AgentArgs) -> Result<i32> {
    if args.labels.list_presets {
        println!("{}", format_presets());
        return Ok(0);
    }

    let (policy, aliases) = load_config(&args.config)?;
    let labels = build_labels(&policy, &args.labels)?;

    if args.stdin_message {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read message from stdin")?;
        args.message = Some(body.trim().to_string());
    }
    if args.message.is_none() {
        return Err(anyhow!(
            "Provide --message or --stdin-message when using the agent command"
        ));
    }

    let agent_content = std::fs::read_to_string(&args.agent_routing)
        .with_context(|| format!("Failed to read {}", args.agent_routing.display()))?;
    let agent_cfg: AgentRouting = serde_json::from_str(&agent_content)
        .with_context(|| format!("Invalid JSON in {}", args.agent_routing.display()))?;

    let model_route = resolve(&policy, &aliases, labels.clone(), &ResolveOptions::default());
    let pick = pick_agent(&agent_cfg, &labels);
    let thinking = pick_thinking(&agent_cfg, &labels, args.thinking.as_deref());

    let command = build_agent_command(
        &agent_cfg,
        &pick.agent,
        &AgentCommandOptions {
            message: args.message.clone(),
            to: args.to.clone(),
            session_id: args.session_id.clone(),
            local: args.local,
            deliver: args.deliver,
            json_output: args.json_output,
            thinking: thinking.clone(),
            timeout: args.timeout,
        },
    );

    if args.show_command {
        println!("{}", command.join(" "));
    }

    let mut output = serde_json::json!({
        "labels": labels,
        "agent": pick.agent,
        "agent_rule": pick.matched_rule,
        "agent_notes": pick.notes,
        "thinking": thinking,
        "model_route": {
            "primary": model_route.primary,
            "fallbacks": model_route.fallbacks,
            "stage_plan": model_route.stage_plan,
            "matched_rules": model_route.matched_rules,
            "matched_constraints": model_route.matched_constraints,
            "blocked_providers": model_route.blocked_providers,
        },
        "command": command,
        "executed": false,
    });

    if args.run {
        let child = std::process::Command::new(&command[0])
            .args(&command[1..])
            .output()
            .with_context(|| format!("Failed to execute {}", command[0]))?;
        let code = child.status.code().unwrap_or(1);
        output["executed"] = serde_json::json!(true);
        output["returncode"] = serde_json::json!(code);
        output["stdout"] = serde_json::json!(String::from_utf8_lossy(&child.stdout));
        output["stderr"] = serde_json::json!(String::from_utf8_lossy(&child.stderr));
        print_json(&output, args.pretty)?;
        return Ok(code);
    }

    print_json(&output, args.pretty)?;
    Ok(0)
}
