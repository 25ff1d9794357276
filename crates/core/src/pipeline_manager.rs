//! High-level pipeline management interface
//!
//! This module provides the [`PipelineManager`] which serves as the primary
//! interface for pipeline operations. It encapsulates loading the pipeline
//! file, building the task graph from it, planning, and running.
//!
//! The PipelineManager abstracts away:
//! - Parsing and checking the pipeline configuration
//! - Wiring declared commands and scripts into task actions
//! - Execution planning and dependency resolution
//! - Merging file-level run settings with caller overrides
//!
//! ## Example
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
//! // Show the plan without running anything
//! let order = manager.get_execution_plan(&["publish".to_string()])?;
//!
//! // Run a target
//! let result = manager
//!     .run(&["test".to_string()], RunSettings::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::configs::pipeline::{
    parse_pipeline_config, Command, PipelineConfig, RunSettings, TaskConfig,
};
use crate::execution::command::CommandExecutor;
use crate::execution::runner::{RunOptions, TaskRunner};
use crate::graph::TaskGraph;
use crate::plan::build_plan;
use crate::results::{GraphReport, RunResult, TaskInfo};
use crate::task::{Task, TaskAction};
use crate::types::{GantryError, GantryResult};

/// High-level pipeline manager that encapsulates all pipeline operations
#[derive(Debug)]
pub struct PipelineManager {
    pub config: PipelineConfig,
    root: PathBuf,
}

/// Configuration for initializing a pipeline manager
#[derive(Debug)]
pub struct PipelineManagerConfig {
    pub pipeline_file: PathBuf,
}

impl PipelineManager {
    /// Load and check a pipeline file.
    ///
    /// The graph is built once here to surface configuration errors
    /// (duplicate tasks, unknown references, malformed actions) early.
    /// Cycles are deliberately not an error yet: `graph` can still render
    /// them; `plan` and `run` reject them.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::Io`] / [`GantryError::Yaml`] for unreadable
    /// or malformed files, and the configuration variants for bad task
    /// definitions.
    pub fn new(config: PipelineManagerConfig) -> GantryResult<Self> {
        let content = fs::read_to_string(&config.pipeline_file)?;
        let pipeline = parse_pipeline_config(&content)?;
        let root = config
            .pipeline_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        let manager = Self {
            config: pipeline,
            root,
        };
        manager.build_graph()?;
        Ok(manager)
    }

    /// Tasks in declaration order, for listings.
    pub fn list_tasks(&self) -> Vec<TaskInfo> {
        self.config
            .tasks
            .iter()
            .map(|t| TaskInfo {
                name: t.name.clone(),
                description: t.description.clone(),
                group: t.group.clone(),
                enabled: t.enabled.unwrap_or(true),
            })
            .collect()
    }

    /// Execution order for the given targets, without running anything.
    ///
    /// # Errors
    ///
    /// Fails on cycles and unknown target names.
    pub fn get_execution_plan(&self, targets: &[String]) -> GantryResult<Vec<String>> {
        let graph = self.build_graph()?;
        let plan = build_plan(&graph, targets)?;
        Ok(plan.task_names(&graph))
    }

    /// The declared graph, cycles included, for rendering.
    ///
    /// # Errors
    ///
    /// Fails only on configuration errors, not on cycles.
    pub fn dependency_graph(&self) -> GantryResult<GraphReport> {
        let graph = self.build_graph()?;
        let mut dependencies = Vec::new();
        let mut finalizers = Vec::new();
        for (index, task) in graph.tasks().iter().enumerate() {
            for edge in graph.dependencies(index) {
                dependencies.push((task.name.clone(), graph.task(edge.prerequisite).name.clone()));
            }
            for &finalizer in graph.finalizers(index) {
                finalizers.push((task.name.clone(), graph.task(finalizer).name.clone()));
            }
        }
        Ok(GraphReport {
            tasks: graph.tasks().iter().map(|t| t.name.clone()).collect(),
            dependencies,
            finalizers,
            cycles: graph.find_cycles(),
        })
    }

    /// Run the given targets. `overrides` (typically CLI flags) take
    /// precedence over the pipeline file's settings.
    ///
    /// # Errors
    ///
    /// Planning and configuration problems fail here before any action
    /// runs; task failures are reported in the returned [`RunResult`].
    pub async fn run(&self, targets: &[String], overrides: RunSettings) -> GantryResult<RunResult> {
        let graph = self.build_graph()?;
        let runner = TaskRunner::new(graph, self.run_options(&overrides));
        runner.run(targets).await
    }

    fn run_options(&self, overrides: &RunSettings) -> RunOptions {
        let defaults = self.config.settings.clone().unwrap_or_default();
        RunOptions {
            fail_fast: overrides
                .fail_fast
                .or(defaults.fail_fast)
                .unwrap_or(false),
            timeout_per_task: overrides
                .task_timeout_secs
                .or(defaults.task_timeout_secs)
                .map(Duration::from_secs),
            max_parallel: overrides
                .max_parallel
                .or(defaults.max_parallel)
                .unwrap_or(1)
                .max(1),
        }
    }

    /// Build a fresh graph for one use. The graph is rebuilt per run so a
    /// run always starts from pending statuses.
    fn build_graph(&self) -> GantryResult<TaskGraph> {
        let executor = CommandExecutor::new(self.root.clone());
        let mut graph = TaskGraph::new();

        for task_config in &self.config.tasks {
            let action = Self::action_for(&executor, task_config)?;
            let mut task = Task::new(&task_config.name, action)
                .with_enabled(task_config.enabled.unwrap_or(true));
            if let Some(description) = &task_config.description {
                task = task.with_description(description);
            }
            if let Some(group) = &task_config.group {
                task = task.with_group(group);
            }
            graph.add_task(task)?;
        }

        // Edges second, so declaration order of tasks does not constrain
        // reference order in the file.
        for task_config in &self.config.tasks {
            if let Some(deps) = &task_config.depends_on {
                for dep in deps {
                    graph.add_dependency(&task_config.name, dep)?;
                }
            }
            if let Some(finalizers) = &task_config.finalized_by {
                for finalizer in finalizers {
                    graph.add_finalizer(&task_config.name, finalizer)?;
                }
            }
        }

        Ok(graph)
    }

    fn action_for(
        executor: &CommandExecutor,
        task_config: &TaskConfig,
    ) -> GantryResult<TaskAction> {
        match (&task_config.script, &task_config.command) {
            (Some(script), None) => Ok(executor.script_action(&task_config.name, script)),
            (None, Some(Command::Single(cmd))) => {
                Ok(executor.shell_action(&task_config.name, cmd))
            }
            (None, Some(Command::Multiple(argv))) => match argv.split_first() {
                Some((program, args)) => {
                    Ok(executor.argv_action(&task_config.name, program, args))
                }
                None => Err(GantryError::Config(format!(
                    "Task '{}' has an empty command list",
                    task_config.name
                ))),
            },
            (Some(_), Some(_)) => Err(GantryError::Config(format!(
                "Task '{}' declares both a script and a command",
                task_config.name
            ))),
            (None, None) => Err(GantryError::Config(format!(
                "Task '{}' has no script or command to execute",
                task_config.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{SkipReason, TaskStatus};
    use std::io::Write;

    fn write_pipeline(content: &str) -> (tempfile::TempDir, PipelineManager) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gantry.yml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let manager = PipelineManager::new(PipelineManagerConfig {
            pipeline_file: path,
        })
        .expect("pipeline should load");
        (temp_dir, manager)
    }

    const RELEASE_PIPELINE: &str = r#"
name: java-library
tasks:
  - name: format
    group: verification
    command: "true"
  - name: compile
    dependsOn: [format]
    command: "true"
  - name: test
    dependsOn: [compile]
    command: "true"
    finalizedBy: [coverageReport]
  - name: coverageReport
    command: "true"
  - name: packageJar
    dependsOn: [test]
    command: "true"
"#;

    #[test]
    fn plan_orders_the_release_pipeline() {
        let (_dir, manager) = write_pipeline(RELEASE_PIPELINE);
        let order = manager
            .get_execution_plan(&["packageJar".to_string()])
            .expect("plan should build");
        assert_eq!(order, vec!["format", "compile", "test", "packageJar"]);
    }

    #[test]
    fn manager_is_debug_renderable() {
        let (_dir, manager) = write_pipeline(RELEASE_PIPELINE);
        let rendered = format!("{manager:?}");
        assert!(rendered.contains("java-library"));
        assert!(rendered.contains("packageJar"));
    }

    #[test]
    fn graph_report_carries_finalizer_edges() {
        let (_dir, manager) = write_pipeline(RELEASE_PIPELINE);
        let report = manager.dependency_graph().expect("graph should build");
        assert!(report.cycles.is_empty());
        assert!(report
            .finalizers
            .contains(&("test".to_string(), "coverageReport".to_string())));
        assert!(report
            .dependencies
            .contains(&("compile".to_string(), "format".to_string())));
    }

    #[test]
    fn cyclic_pipeline_loads_but_does_not_plan() {
        let (_dir, manager) = write_pipeline(
            r#"
tasks:
  - name: a
    command: "true"
    dependsOn: [b]
  - name: b
    command: "true"
    dependsOn: [a]
"#,
        );
        let report = manager.dependency_graph().expect("graph still renders");
        assert_eq!(report.cycles, vec![vec!["a".to_string(), "b".to_string()]]);

        let err = manager
            .get_execution_plan(&["a".to_string()])
            .expect_err("plan must reject cycles");
        assert!(matches!(err, GantryError::CycleDetected(_)));
    }

    #[test]
    fn task_with_script_and_command_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gantry.yml");
        fs::write(
            &path,
            r#"
tasks:
  - name: confused
    script: ./run.sh
    command: echo hi
"#,
        )
        .unwrap();
        let err = PipelineManager::new(PipelineManagerConfig {
            pipeline_file: path,
        })
        .expect_err("ambiguous action should be rejected");
        assert!(matches!(err, GantryError::Config(msg) if msg.contains("confused")));
    }

    #[test]
    fn unknown_dependency_is_rejected_at_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gantry.yml");
        fs::write(
            &path,
            r#"
tasks:
  - name: a
    command: "true"
    dependsOn: [ghost]
"#,
        )
        .unwrap();
        let err = PipelineManager::new(PipelineManagerConfig {
            pipeline_file: path,
        })
        .expect_err("unknown reference should be rejected");
        assert!(matches!(err, GantryError::UnknownTask { task, .. } if task == "ghost"));
    }

    #[tokio::test]
    async fn run_executes_commands_against_the_pipeline_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gantry.yml");
        fs::write(
            &path,
            r#"
tasks:
  - name: produce
    command: echo made > artifact.txt
  - name: consume
    dependsOn: [produce]
    command: test -f artifact.txt
"#,
        )
        .unwrap();
        let manager = PipelineManager::new(PipelineManagerConfig {
            pipeline_file: path,
        })
        .unwrap();

        let result = manager
            .run(&["consume".to_string()], RunSettings::default())
            .await
            .expect("run should complete");
        assert!(result.success);
        assert!(temp_dir.path().join("artifact.txt").exists());
    }

    #[tokio::test]
    async fn failing_command_propagates_as_upstream_skip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gantry.yml");
        fs::write(
            &path,
            r#"
tasks:
  - name: compile
    command: exit 1
  - name: test
    dependsOn: [compile]
    command: "true"
"#,
        )
        .unwrap();
        let manager = PipelineManager::new(PipelineManagerConfig {
            pipeline_file: path,
        })
        .unwrap();

        let result = manager
            .run(&["test".to_string()], RunSettings::default())
            .await
            .expect("run should complete");
        assert!(!result.success);
        assert!(matches!(
            result.status("compile"),
            Some(TaskStatus::Failed(_))
        ));
        assert_eq!(
            result.status("test"),
            Some(&TaskStatus::Skipped(SkipReason::UpstreamFailure))
        );
    }
}
