use thiserror::Error;

/// The main error type for Gantry operations.
///
/// Every variant here is a configuration or planning problem: it is
/// detected before any task action runs and aborts the whole request.
/// Task action failures are never surfaced through this type; they are
/// recorded as statuses in the run report instead.
#[derive(Debug, Error)]
pub enum GantryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Unknown task '{task}' referenced by '{referenced_by}'")]
    UnknownTask { task: String, referenced_by: String },

    #[error("Dependency cycle detected: {}", format_cycle(.0))]
    CycleDetected(Vec<String>),
}

/// Result type alias for Gantry operations
pub type GantryResult<T> = Result<T, GantryError>;

fn format_cycle(cycle: &[String]) -> String {
    let mut path: Vec<&str> = cycle.iter().map(String::as_str).collect();
    if let Some(first) = path.first().copied() {
        path.push(first);
    }
    path.join(" -> ")
}
