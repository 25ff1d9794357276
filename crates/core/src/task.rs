//! Task model
//!
//! A task is a named unit of work wrapping an opaque action. The core never
//! interprets what an action does; it only records the terminal outcome as a
//! status, together with timing, in the run report.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Failure reported by a task action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The opaque invocable unit behind a task. Actions run on a blocking
/// worker thread, so they must be `Send + Sync`.
pub type TaskAction = Arc<dyn Fn() -> Result<(), ActionError> + Send + Sync>;

/// Why a task was skipped instead of run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UpstreamFailure,
    FailFastAbort,
    RunCancelled,
    Disabled,
    /// Skip explicitly requested before the run started.
    Requested(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UpstreamFailure => write!(f, "upstream failure"),
            SkipReason::FailFastAbort => write!(f, "fail-fast abort"),
            SkipReason::RunCancelled => write!(f, "run cancelled"),
            SkipReason::Disabled => write!(f, "task disabled"),
            SkipReason::Requested(reason) => write!(f, "{reason}"),
        }
    }
}

/// Why a task ended `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Action(ActionError),
    /// The action exceeded the configured per-task time limit.
    Timeout(Duration),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Action(err) => write!(f, "{err}"),
            FailureCause::Timeout(limit) => {
                write!(f, "timed out after {}s", limit.as_secs())
            }
        }
    }
}

/// Lifecycle status of a task within a single run.
///
/// Statuses are created fresh per run; a graph is consumed by a run and
/// never reused, so there is no reset transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Skipped(SkipReason),
    Succeeded,
    Failed(FailureCause),
}

impl TaskStatus {
    /// A terminal status will never change again for this run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Skipped(_) | TaskStatus::Succeeded | TaskStatus::Failed(_)
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TaskStatus::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskStatus::Skipped(_))
    }
}

/// A named unit of work with an opaque action and display metadata.
#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub enabled: bool,
    /// Set before the run starts; the scheduler honors it instead of
    /// invoking the action.
    pub skip_requested: Option<String>,
    action: TaskAction,
}

impl Task {
    pub fn new(name: impl Into<String>, action: TaskAction) -> Self {
        Self {
            name: name.into(),
            description: None,
            group: None,
            enabled: true,
            skip_requested: None,
            action,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Hand out the action for execution. The `Arc` clone lets the
    /// scheduler move it onto a blocking worker thread.
    pub fn action(&self) -> TaskAction {
        Arc::clone(&self.action)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("group", &self.group)
            .field("enabled", &self.enabled)
            .field("skip_requested", &self.skip_requested)
            .finish_non_exhaustive()
    }
}

/// Convenience constructor for an action that always succeeds. Mostly
/// useful for aggregate "lifecycle" tasks that only exist to order others.
pub fn noop_action() -> TaskAction {
    Arc::new(|| Ok(()))
}
