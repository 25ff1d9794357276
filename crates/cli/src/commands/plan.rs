use colored::*;
use gantry_core::pipeline_manager::PipelineManager;
use gantry_core::GantryResult;

pub fn execute(manager: &PipelineManager, targets: &[String]) -> GantryResult<()> {
    println!("{} {}", "Execution plan for".bold(), targets.join(", ").cyan());

    let order = manager.get_execution_plan(targets)?;

    println!("\n{}:", "Execution order".bold());
    for (i, task) in order.iter().enumerate() {
        println!("  {}. {}", i + 1, task);
    }

    Ok(())
}
