//! Binary entry point for the Penumbra start-step CLI.
#![forbid(unsafe_code)]

#[path = "cli/config.rs"]
mod config;
#[path = "cli/ui.rs"]
mod ui;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use penumbra::query::resolver::Resolver;
use penumbra::storage::fixture::Fixture;
use penumbra::storage::{Element, Graph, MemGraph};
use penumbra::{AccessPath, Constraint, ElementId, GraphStep, Predicate, Value};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::ui::{Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "penumbra",
    version,
    about = "Plan and resolve graph traversal start steps",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "PENUMBRA_GRAPH",
        help = "JSON graph fixture to plan against"
    )]
    graph: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "PENUMBRA_CONFIG",
        help = "CLI config file (defaults to the user config directory)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = ThemeArg::Auto,
        help = "Colour theme for text output"
    )]
    theme: ThemeArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the access path chosen for a start step
    Explain {
        #[command(flatten)]
        step: StepArgs,

        #[arg(long, help = "Replace literal values with `?`")]
        redact: bool,
    },
    /// Resolve a start step and print the matching elements
    Resolve {
        #[command(flatten)]
        step: StepArgs,
    },
}

#[derive(Args, Debug)]
struct StepArgs {
    #[arg(long, help = "Resolve edges instead of vertices")]
    edges: bool,

    #[arg(long = "id", value_name = "ID", help = "Explicit element id (repeatable)")]
    ids: Vec<u64>,

    #[arg(long, value_name = "LABEL", help = "Restrict to one element label")]
    label: Option<String>,

    #[arg(
        long = "has",
        value_name = "KEY=OP:VALUE",
        value_parser = parse_constraint,
        help = "Constraint such as name=eq:\"Alice\" or age=within:[30,41] (repeatable)"
    )]
    constraints: Vec<Constraint>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Auto,
    Plain,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Plain => Theme::Plain,
        }
    }
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    step: String,
    path: &'a AccessPath,
    elements: &'a [Element],
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.clone())?;
    let graph_path = cli
        .graph
        .clone()
        .or_else(|| config.default_graph_path().cloned())
        .ok_or("no graph fixture: pass --graph or set [graph] default in the CLI config")?;
    tracing::debug!(
        graph = %graph_path.display(),
        config = ?config.path(),
        "cli.graph.load"
    );
    let graph = Arc::new(Fixture::load(&graph_path)?.into_graph()?);
    let ui = Ui::new(cli.theme.into());

    match cli.command {
        Command::Explain { step, redact } => {
            let step = build_step(&step, &config, &graph);
            let explain = step.explain()?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&explain)?),
                OutputFormat::Text => ui.block("Plan", &explain.render(redact)),
            }
        }
        Command::Resolve { step } => {
            let step = build_step(&step, &config, &graph);
            let path = step.plan()?;
            let elements = Resolver::new(graph.as_ref()).resolve(
                &path,
                step.kind(),
                step.constraints(),
            )?;
            match cli.format {
                OutputFormat::Json => {
                    let report = ResolveReport {
                        step: step.to_string(),
                        path: &path,
                        elements: &elements,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Text => {
                    ui.section(
                        "Step",
                        [("step", step.to_string()), ("path", path.to_string())],
                    );
                    ui.list("Elements", elements.iter().map(describe_element));
                }
            }
        }
    }

    Ok(())
}

fn build_step(args: &StepArgs, config: &CliConfig, graph: &Arc<MemGraph>) -> GraphStep {
    let ids = args.ids.iter().copied().map(ElementId);
    let shared: Arc<dyn Graph> = graph.clone();
    let mut step = if args.edges {
        GraphStep::edges(ids)
    } else {
        GraphStep::vertices(ids)
    }
    .attach(shared)
    .with_config(config.planner_config());
    if let Some(label) = &args.label {
        step.add_constraint(Constraint::label(label.as_str()));
    }
    for constraint in &args.constraints {
        step.add_constraint(constraint.clone());
    }
    step
}

fn describe_element(element: &Element) -> String {
    let props: Vec<String> = element
        .properties
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if props.is_empty() {
        format!("{element} {}", element.label)
    } else {
        format!("{element} {} {{{}}}", element.label, props.join(", "))
    }
}

fn parse_constraint(raw: &str) -> Result<Constraint, String> {
    let (key, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=OP:VALUE, got '{raw}'"))?;
    let (op, value) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected OP:VALUE after '{key}=', got '{rest}'"))?;
    if key.is_empty() {
        return Err("constraint key must not be empty".into());
    }
    let predicate =
        Predicate::from_name(op).ok_or_else(|| format!("unknown predicate '{op}'"))?;
    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => Value::try_from(&json).map_err(|err| err.to_string())?,
        Err(_) => Value::from(value),
    };
    Ok(Constraint::new(key, predicate, value))
}
