//! Task execution module
//!
//! This module handles the actual execution of planned tasks including
//! command actions, finalizer scheduling, and result reporting.

pub mod command;
pub mod levels;
pub mod runner;

pub use command::CommandExecutor;
pub use levels::group_into_levels;
pub use runner::{RunOptions, TaskRunner};
