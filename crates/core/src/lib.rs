//! Gantry Core Library
//!
//! This is the core library for the Gantry pipeline runner. It provides the
//! task model, dependency graph, execution planning, and the runner that
//! drives external commands to completion.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`pipeline_manager`] - High-level pipeline management interface
//! - [`execution`] - Task execution engine: runner, levels, command actions
//! - [`graph`] - Task dependency graph with validation
//! - [`plan`] - Deterministic execution planning
//! - [`task`] - Task model and statuses
//! - [`configs`] - Pipeline configuration parsing
//! - [`results`] - Result types for runs and reports
//! - [`console`] - Terminal color and status helpers
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The primary entry point is the [`PipelineManager`] which provides a
//! high-level interface over a pipeline file:
//!
//! ```rust,no_run
//! use gantry_core::pipeline_manager::{PipelineManager, PipelineManagerConfig};
//! use gantry_core::configs::RunSettings;
//! use std::path::PathBuf;
//!
//! # async fn example() -> gantry_core::types::GantryResult<()> {
//! let manager = PipelineManager::new(PipelineManagerConfig {
//!     pipeline_file: PathBuf::from("gantry.yml"),
//! })?;
//!
//! let result = manager.run(&["test".to_string()], RunSettings::default()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The graph and runner can also be driven directly, with arbitrary
//! closures as task actions:
//!
//! ```rust
//! use gantry_core::execution::{RunOptions, TaskRunner};
//! use gantry_core::graph::TaskGraph;
//! use gantry_core::task::{noop_action, Task};
//!
//! # async fn example() -> gantry_core::types::GantryResult<()> {
//! let mut graph = TaskGraph::new();
//! graph.add_task(Task::new("compile", noop_action()))?;
//! graph.add_task(Task::new("test", noop_action()))?;
//! graph.add_dependency("test", "compile")?;
//!
//! let runner = TaskRunner::new(graph, RunOptions::default());
//! let result = runner.run(&["test".to_string()]).await?;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod console;
pub mod execution;
pub mod graph;
pub mod pipeline_manager;
pub mod plan;
pub mod results;
pub mod task;
pub mod types;

// Re-export the main types for easier usage
pub use pipeline_manager::{PipelineManager, PipelineManagerConfig};
pub use types::{GantryError, GantryResult};
