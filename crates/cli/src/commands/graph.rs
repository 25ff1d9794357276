use std::collections::HashMap;

use anyhow::Result;
use colored::*;
use gantry_core::pipeline_manager::PipelineManager;

pub fn execute(manager: &PipelineManager) -> Result<()> {
    println!("{}", "Task Dependency Graph:".bold().underline());

    let report = manager
        .dependency_graph()
        .map_err(|e| anyhow::anyhow!("Failed to get dependency graph: {}", e))?;

    if !report.cycles.is_empty() {
        let cycles_description = report
            .cycles
            .iter()
            .map(|cycle| {
                let mut path = cycle.clone();
                if let Some(first) = path.first().cloned() {
                    path.push(first);
                }
                path.join(" -> ")
            })
            .collect::<Vec<_>>()
            .join("; ");

        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!("Circular dependencies detected: {}", cycles_description).yellow()
        );
    }

    let mut dependencies: HashMap<&str, Vec<&str>> = HashMap::new();
    for (dependent, prerequisite) in &report.dependencies {
        dependencies
            .entry(dependent.as_str())
            .or_default()
            .push(prerequisite.as_str());
    }
    let mut finalizers: HashMap<&str, Vec<&str>> = HashMap::new();
    for (trigger, finalizer) in &report.finalizers {
        finalizers
            .entry(trigger.as_str())
            .or_default()
            .push(finalizer.as_str());
    }

    for task in &report.tasks {
        println!("{}", task.blue().bold());

        match dependencies.get(task.as_str()) {
            Some(deps) => println!("  {} {}", "depends on:".dimmed(), deps.join(", ")),
            None => println!("  {}", "no dependencies".dimmed()),
        }
        if let Some(fins) = finalizers.get(task.as_str()) {
            println!("  {} {}", "finalized by:".dimmed(), fins.join(", "));
        }
        println!();
    }

    Ok(())
}
