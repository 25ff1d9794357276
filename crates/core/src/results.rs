//! Result types for pipeline operations
//!
//! This module contains the report types returned by the runner and the
//! pipeline manager, providing a centralized location for output structures.

use crate::task::TaskStatus;

/// Terminal outcome of one task within a run.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub name: String,
    pub status: TaskStatus,
    pub duration_ms: u64,
}

impl TaskResult {
    /// Short failure description for report lines; `None` unless the task
    /// ended `Failed`.
    pub fn error_summary(&self) -> Option<String> {
        match &self.status {
            TaskStatus::Failed(cause) => Some(cause.to_string()),
            _ => None,
        }
    }
}

/// Aggregate outcome of one run.
///
/// `task_results` lists the requested closure in plan order, followed by
/// any finalizer-only tasks in the order they executed.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub task_results: Vec<TaskResult>,
    /// False iff a task of the requested closure ended `Failed`. A failing
    /// finalizer outside the closure is reported but does not gate this.
    pub success: bool,
    pub total_duration_ms: u64,
    /// First failure recorded during the run, closure or not.
    pub first_failure: Option<String>,
}

impl RunResult {
    pub fn task(&self, name: &str) -> Option<&TaskResult> {
        self.task_results.iter().find(|r| r.name == name)
    }

    pub fn status(&self, name: &str) -> Option<&TaskStatus> {
        self.task(name).map(|r| &r.status)
    }
}

/// Everything a caller needs to render the dependency graph.
#[derive(Debug, Clone)]
pub struct GraphReport {
    /// Task names in declaration order.
    pub tasks: Vec<String>,
    /// `(dependent, prerequisite)` pairs.
    pub dependencies: Vec<(String, String)>,
    /// `(trigger, finalizer)` pairs.
    pub finalizers: Vec<(String, String)>,
    /// Cycle task sequences, empty for a valid graph.
    pub cycles: Vec<Vec<String>>,
}

/// One row of `gantry list`.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub enabled: bool,
}
