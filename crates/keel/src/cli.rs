//! Command line front end
//!
//! Loads configuration, initialises logging, assembles every candidate
//! linked into the binary and runs one command against the result. Ctrl-C
//! interrupts the command; lifecycle members are stopped either way.

use clap::{Parser, Subcommand};
use keel_application::ports::{GraphRenderer, StaticScan};
use keel_application::use_cases::MigrationReport;
use keel_domain::error::Result;
use keel_infrastructure::config::{AppConfig, ConfigLoader};
use keel_infrastructure::graph::JsonGraphRenderer;
use keel_infrastructure::logging::init_logging;
use keel_infrastructure::{AppContext, Assembler};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Exit status after an interrupted run (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Command line interface for keel
#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(about = "keel - assemble, inspect and migrate an application")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Install override modules, replacing earlier bindings of the same keys
    #[arg(long = "override")]
    pub override_mode: bool,

    /// What to do with the assembled application
    #[command(subcommand)]
    pub command: Command,
}

/// Commands run against the assembled application
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Resolve every binding and report wiring errors
    Check,
    /// Resolve every binding and print the dependency graph
    Graph {
        /// Print edges and orphans as JSON instead of text art
        #[arg(long)]
        json: bool,
    },
    /// Apply pending migrations
    Migrate,
}

/// How a command run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command finished; holds what it prints
    Completed(String),
    /// Ctrl-C arrived before the command finished
    Interrupted,
}

/// Load configuration, initialise logging, assemble and run the command
pub async fn run(cli: Cli) -> Result<Outcome> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    let context = assemble(config, &cli)?;
    run_until(cli.command, &context, tokio::signal::ctrl_c()).await
}

/// Run `command` until it finishes or `interrupt` resolves, then shut down
///
/// A failing `interrupt` (no signal listener available) is logged and the
/// command runs to completion.
pub async fn run_until<F>(
    command: Command,
    context: &AppContext,
    interrupt: F,
) -> Result<Outcome>
where
    F: Future<Output = std::io::Result<()>>,
{
    let interrupted = async {
        if let Err(e) = interrupt.await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let outcome = tokio::select! {
        biased;
        () = interrupted => {
            warn!(command = ?command, "Interrupted");
            Ok(Outcome::Interrupted)
        }
        output = execute(command, context) => output.map(Outcome::Completed),
    };
    let stopped = context.shutdown().await?;
    info!(stopped, "Application shut down");
    outcome
}

fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load()
}

/// Assemble the linked candidates with the command line applied to `config`
pub fn assemble(mut config: AppConfig, cli: &Cli) -> Result<AppContext> {
    if cli.override_mode {
        config.assembly.override_mode = true;
    }
    if matches!(cli.command, Command::Graph { json: false }) {
        config.assembly.render_graph = true;
    }
    Assembler::new(config).scan(StaticScan).assemble()
}

/// Run `command` against an assembled application
pub async fn execute(command: Command, context: &AppContext) -> Result<String> {
    match command {
        Command::Check => {
            let resolved = context.container().validate()?;
            info!(keys = resolved, "Assembly check passed");
            Ok(format!(
                "{}: {resolved} bindings resolved",
                context.application()
            ))
        }
        Command::Graph { json } => {
            context.container().validate()?;
            if json {
                Ok(JsonGraphRenderer::new().render(&context.graph()))
            } else {
                Ok(context.render_graph())
            }
        }
        Command::Migrate => {
            let report = context.run_migrations().await?;
            Ok(describe_report(&report))
        }
    }
}

fn describe_report(report: &MigrationReport) -> String {
    let position = report
        .current_index()
        .map_or_else(|| "none".to_string(), |index| index.to_string());
    format!(
        "{}: applied {} migration(s), skipped {}, now at {position}",
        report.application,
        report.applied.len(),
        report.skipped
    )
}
