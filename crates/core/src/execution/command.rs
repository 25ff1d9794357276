//! Command-backed task actions
//!
//! This module turns the different command shapes a pipeline file can declare
//! (shell commands, script files, executable with args) into task actions with
//! consistent error reporting. The core never interprets what these external
//! tools do; it only observes their exit status.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::task::{ActionError, TaskAction};

/// Builds task actions that execute external commands rooted at the
/// pipeline's directory.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    root: PathBuf,
}

impl CommandExecutor {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Action running a single shell command via `sh -c`.
    pub fn shell_action(&self, task_name: &str, cmd: &str) -> TaskAction {
        let root = self.root.clone();
        let task_name = task_name.to_string();
        let cmd = cmd.to_string();
        Arc::new(move || {
            let mut command = Command::new("sh");
            command.arg("-c").arg(&cmd);
            run_command(
                &mut command,
                &root,
                &task_name,
                &format!("Failed to execute command '{cmd}'"),
                &format!("Command '{cmd}' failed with exit code"),
            )
        })
    }

    /// Action running an executable with arguments, no shell involved.
    pub fn argv_action(&self, task_name: &str, program: &str, args: &[String]) -> TaskAction {
        let root = self.root.clone();
        let task_name = task_name.to_string();
        let program = program.to_string();
        let args = args.to_vec();
        Arc::new(move || {
            let mut command = Command::new(&program);
            command.args(&args);
            run_command(
                &mut command,
                &root,
                &task_name,
                &format!("Failed to execute command '{program}'"),
                &format!("Command '{program}' failed with exit code"),
            )
        })
    }

    /// Action running a script file. A relative path is resolved against
    /// the pipeline root at invocation time.
    pub fn script_action(&self, task_name: &str, script_path: &str) -> TaskAction {
        let root = self.root.clone();
        let task_name = task_name.to_string();
        let script_path = PathBuf::from(script_path);
        Arc::new(move || {
            let full_script_path = if script_path.is_relative() {
                root.join(&script_path)
            } else {
                script_path.clone()
            };

            if !full_script_path.exists() {
                return Err(ActionError::new(format!(
                    "Script file '{}' not found",
                    full_script_path.display()
                )));
            }

            let mut command = Command::new(&full_script_path);
            run_command(
                &mut command,
                &root,
                &task_name,
                &format!(
                    "Failed to execute script: {}",
                    full_script_path.display()
                ),
                "Script execution failed with exit code",
            )
        })
    }
}

/// Execute a prepared command with common setup and error mapping.
fn run_command(
    command: &mut Command,
    root: &Path,
    task_name: &str,
    execution_error_message: &str,
    failure_error_message: &str,
) -> Result<(), ActionError> {
    command.current_dir(root);
    command.env("GANTRY_TASK", task_name);

    let status = command
        .status()
        .map_err(|e| ActionError::new(format!("{execution_error_message}: {e}")))?;

    if !status.success() {
        return Err(ActionError::new(format!(
            "{failure_error_message}: {}",
            status.code().unwrap_or(-1)
        )));
    }

    Ok(())
}
