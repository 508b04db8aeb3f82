//! curgraph CLI: query and plan over a curriculum graph.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use curriculum_graph::config::EngineConfig;
use curriculum_graph::curriculum::{NodeId, Subject};
use curriculum_graph::engine::CurriculumEngine;
use curriculum_graph::progress::{ProgressCommand, ProgressEvent, ProgressLog};

#[derive(Parser)]
#[command(name = "curgraph", version, about = "Curriculum graph engine")]
struct Cli {
    /// Curriculum dataset (JSON). Overrides `dataset_path` from the config file.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Engine configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show graph statistics.
    Info,

    /// List subjects with their starting units.
    Subjects,

    /// List the courses of a subject in grade order.
    Courses {
        subject: Subject,
    },

    /// Show a single unit.
    Node {
        id: String,
    },

    /// Show the unit after the given one.
    Next {
        id: String,
    },

    /// Show the unit before the given one.
    Prev {
        id: String,
    },

    /// List the units leading up to a unit within its subject.
    Trail {
        id: String,
    },

    /// List all transitive prerequisites of a unit, dependencies first.
    Prereqs {
        id: String,
    },

    /// Find an ordered route between two units.
    Path {
        from: String,
        to: String,
    },

    /// Summarise progress per subject from an event file.
    Progress {
        /// JSON array of progress events.
        #[arg(long)]
        events: PathBuf,
    },

    /// Apply a progress action to an event file and print the updated events.
    Record {
        /// JSON array of progress events. Created if missing.
        #[arg(long)]
        events: PathBuf,

        /// Write the result back to the event file instead of stdout.
        #[arg(long)]
        in_place: bool,

        #[command(subcommand)]
        action: RecordAction,
    },

    /// Assemble a learning plan toward per-subject goals.
    Plan {
        /// JSON array of progress events.
        #[arg(long)]
        events: Option<PathBuf>,

        /// Goal unit for a subject, e.g. `math=math-g3-u2`. Repeatable.
        #[arg(long = "goal", value_parser = parse_goal)]
        goals: Vec<(Subject, NodeId)>,
    },
}

#[derive(Subcommand)]
enum RecordAction {
    /// Mark a unit complete and start the next one.
    Complete { id: String },
    /// Step back from a unit to the one before it.
    GoBack { id: String },
    /// Start a subject at the given unit.
    Start { id: String },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dataset) = cli.dataset {
        config.dataset_path = Some(dataset);
    }
    let engine = CurriculumEngine::new(config)?;

    match cli.command {
        Commands::Info => {
            println!("{}", engine.info());
        }

        Commands::Subjects => print_json(&engine.subjects())?,

        Commands::Courses { subject } => print_json(&engine.courses(subject))?,

        Commands::Node { id } => match engine.node(&id) {
            Some(node) => print_json(&node)?,
            None => miette::bail!("no unit with id \"{id}\""),
        },

        Commands::Next { id } => print_json(&engine.next(&id))?,

        Commands::Prev { id } => print_json(&engine.previous(&id))?,

        Commands::Trail { id } => print_json(&engine.trail_to(&id))?,

        Commands::Prereqs { id } => print_json(&engine.prerequisites(&id))?,

        Commands::Path { from, to } => {
            let route = engine.path_between(&from, &to);
            if route.is_empty() {
                eprintln!("No route from {from} to {to}.");
            }
            print_json(&route)?;
        }

        Commands::Progress { events } => {
            let events = read_events(&events)?;
            print_json(&engine.progress_summary(&events))?;
        }

        Commands::Record {
            events,
            in_place,
            action,
        } => {
            let history = if events.exists() {
                read_events(&events)?
            } else {
                Vec::new()
            };
            let command = match action {
                RecordAction::Complete { id } => ProgressCommand::Complete(NodeId::new(id)),
                RecordAction::GoBack { id } => ProgressCommand::GoBack(NodeId::new(id)),
                RecordAction::Start { id } => ProgressCommand::StartSubject(NodeId::new(id)),
            };
            let mut log = ProgressLog::from_events(history);
            let applied = engine.record(&command, &mut log);
            eprintln!("Applied {applied} change(s).");

            let json = serde_json::to_string_pretty(&log.into_events()).into_diagnostic()?;
            if in_place {
                std::fs::write(&events, json).into_diagnostic()?;
            } else {
                println!("{json}");
            }
        }

        Commands::Plan { events, goals } => {
            let events = match events {
                Some(path) => read_events(&path)?,
                None => Vec::new(),
            };
            let goals: BTreeMap<Subject, NodeId> = goals.into_iter().collect();
            print_json(&engine.plan(&goals, &events))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn read_events(path: &Path) -> Result<Vec<ProgressEvent>> {
    let content = std::fs::read_to_string(path).into_diagnostic()?;
    serde_json::from_str(&content).into_diagnostic()
}

/// Parse `subject=node-id`.
fn parse_goal(raw: &str) -> std::result::Result<(Subject, NodeId), String> {
    let (subject, id) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected subject=id, got \"{raw}\""))?;
    let subject: Subject = subject
        .trim()
        .parse()
        .map_err(|s| format!("unknown subject \"{s}\""))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("goal for {} has no unit id", subject.as_str()));
    }
    Ok((subject, NodeId::new(id)))
}
