//! Configuration parsing
//!
//! Pipeline files are YAML documents describing the task set, its wiring,
//! and the run defaults.

pub mod pipeline;

pub use pipeline::{parse_pipeline_config, Command, PipelineConfig, RunSettings, TaskConfig};
