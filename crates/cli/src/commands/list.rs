use anyhow::Result;
use colored::*;
use gantry_core::pipeline_manager::PipelineManager;

pub fn execute(manager: &PipelineManager) -> Result<()> {
    let tasks = manager.list_tasks();

    println!("{}", "Tasks".bold().underline());

    if tasks.is_empty() {
        println!("  {}", "No tasks declared".dimmed());
        return Ok(());
    }

    for task in tasks {
        let mut line = task.name.blue().bold().to_string();
        if let Some(group) = &task.group {
            line.push_str(&format!(" {}", format!("[{group}]").cyan()));
        }
        if !task.enabled {
            line.push_str(&format!(" {}", "(disabled)".yellow()));
        }
        println!("{line}");
        if let Some(description) = &task.description {
            println!("  {}", description.dimmed());
        }
    }

    Ok(())
}
