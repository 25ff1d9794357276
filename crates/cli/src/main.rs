use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use gantry_core::pipeline_manager::{PipelineManager, PipelineManagerConfig};
use gantry_core::GantryError;

mod commands;

/// Exit code for planning and configuration errors: cycles, unknown or
/// duplicate tasks, malformed pipeline files.
pub(crate) const EXIT_PLANNING_ERROR: i32 = 2;
/// Exit code when one or more tasks failed.
pub(crate) const EXIT_TASK_FAILURE: i32 = 1;

/// Gantry - A declarative task pipeline runner
#[derive(Parser)]
#[command(name = "gantry")]
#[command(about = "A declarative task pipeline runner")]
#[command(version)]
struct Cli {
    /// Path to the pipeline file
    #[arg(short, long, default_value = "gantry.yml")]
    pipeline: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks declared in the pipeline
    List,
    /// Show the execution plan for targets without running them
    Plan {
        /// Task names to plan
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Run targets and their prerequisites
    Run {
        /// Task names to run
        #[arg(required = true)]
        targets: Vec<String>,

        /// Skip remaining tasks as soon as one fails
        #[arg(long)]
        fail_fast: bool,

        /// Per-task time limit in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Maximum number of tasks running at once
        #[arg(long)]
        max_parallel: Option<usize>,
    },
    /// Show the task dependency graph
    Graph,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            EXIT_PLANNING_ERROR
        }
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> Result<i32> {
    // Initialize the pipeline manager with all business logic
    let manager = PipelineManager::new(PipelineManagerConfig {
        pipeline_file: cli.pipeline,
    })
    .map_err(|e| anyhow::anyhow!("Failed to load pipeline: {}", e))?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::List => {
            commands::list::execute(&manager)?;
            Ok(0)
        }
        Commands::Plan { targets } => {
            commands::plan::execute(&manager, &targets).map_err(planning_error)?;
            Ok(0)
        }
        Commands::Run {
            targets,
            fail_fast,
            timeout_secs,
            max_parallel,
        } => commands::run::execute(&manager, &targets, fail_fast, timeout_secs, max_parallel)
            .await,
        Commands::Graph => {
            commands::graph::execute(&manager)?;
            Ok(0)
        }
    }
}

fn planning_error(err: GantryError) -> anyhow::Error {
    anyhow::anyhow!("Failed to build execution plan: {}", err)
}
