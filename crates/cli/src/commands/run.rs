use anyhow::Result;
use colored::*;
use gantry_core::configs::RunSettings;
use gantry_core::console::format_status;
use gantry_core::pipeline_manager::PipelineManager;

use crate::{EXIT_PLANNING_ERROR, EXIT_TASK_FAILURE};

pub async fn execute(
    manager: &PipelineManager,
    targets: &[String],
    fail_fast: bool,
    timeout_secs: Option<u64>,
    max_parallel: Option<usize>,
) -> Result<i32> {
    println!("{} {}", "Running".bold(), targets.join(", ").cyan());

    let overrides = RunSettings {
        fail_fast: fail_fast.then_some(true),
        task_timeout_secs: timeout_secs,
        max_parallel,
    };

    let result = match manager.run(targets, overrides).await {
        Ok(result) => result,
        Err(err) => {
            eprintln!(
                "{} {}",
                "Error:".red().bold(),
                format!("Failed to run tasks: {err}")
            );
            return Ok(EXIT_PLANNING_ERROR);
        }
    };

    println!();
    println!("{}", "Run report".bold().underline());
    for task_result in &result.task_results {
        match task_result.error_summary() {
            Some(summary) => println!(
                "  {} {} ({}ms) - {}",
                format_status(&task_result.status),
                task_result.name,
                task_result.duration_ms,
                summary.red()
            ),
            None => println!(
                "  {} {} ({}ms)",
                format_status(&task_result.status),
                task_result.name,
                task_result.duration_ms
            ),
        }
    }

    println!();
    if result.success {
        println!(
            "{} {}",
            "✓".green().bold(),
            format!("All tasks completed in {}ms", result.total_duration_ms)
                .green()
                .bold()
        );
        Ok(0)
    } else {
        let failure = result
            .first_failure
            .unwrap_or_else(|| "task failure".to_string());
        println!(
            "{} {}",
            "✗".red().bold(),
            format!("Run failed: {failure}").red().bold()
        );
        Ok(EXIT_TASK_FAILURE)
    }
}
