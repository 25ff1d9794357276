use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::GantryResult;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub script: Option<String>,
    pub command: Option<Command>,
    pub depends_on: Option<Vec<String>>,
    pub finalized_by: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

/// Run defaults declared in the pipeline file. CLI flags override these.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunSettings {
    pub fail_fast: Option<bool>,
    pub task_timeout_secs: Option<u64>,
    pub max_parallel: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<RunSettings>,
    pub tasks: Vec<TaskConfig>,
}

/// Parse a pipeline config document.
///
/// # Errors
///
/// Returns [`crate::types::GantryError::Yaml`] when the document does not
/// match the schema.
pub fn parse_pipeline_config(yaml_str: &str) -> GantryResult<PipelineConfig> {
    let config: PipelineConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_pipeline() {
        let yaml = r#"
name: java-library
description: Library release pipeline
settings:
  failFast: true
  taskTimeoutSecs: 600
  maxParallel: 2
tasks:
  - name: format
    group: verification
    command: ./gradlew spotlessApply
  - name: compile
    dependsOn: [format]
    command: ./gradlew compileJava
  - name: test
    dependsOn: [compile]
    command: ./gradlew test
    finalizedBy: [coverageReport]
  - name: coverageReport
    command: ./gradlew jacocoTestReport
  - name: packageJar
    dependsOn: [test]
    command: ["./gradlew", "jar"]
  - name: bootJar
    enabled: false
    command: ./gradlew bootJar
"#;
        let config = parse_pipeline_config(yaml).expect("config should parse");
        assert_eq!(config.name.as_deref(), Some("java-library"));
        let settings = config.settings.expect("settings present");
        assert_eq!(settings.fail_fast, Some(true));
        assert_eq!(settings.task_timeout_secs, Some(600));
        assert_eq!(settings.max_parallel, Some(2));
        assert_eq!(config.tasks.len(), 6);

        let test_task = config
            .tasks
            .iter()
            .find(|t| t.name == "test")
            .expect("test task present");
        assert_eq!(
            test_task.depends_on.as_deref(),
            Some(&["compile".to_string()][..])
        );
        assert_eq!(
            test_task.finalized_by.as_deref(),
            Some(&["coverageReport".to_string()][..])
        );

        let boot_jar = config
            .tasks
            .iter()
            .find(|t| t.name == "bootJar")
            .expect("bootJar present");
        assert_eq!(boot_jar.enabled, Some(false));
    }

    #[test]
    fn command_accepts_string_or_list() {
        let yaml = r#"
tasks:
  - name: single
    command: echo hello
  - name: multiple
    command: ["echo", "hello"]
"#;
        let config = parse_pipeline_config(yaml).expect("config should parse");
        assert!(matches!(config.tasks[0].command, Some(Command::Single(_))));
        assert!(matches!(
            config.tasks[1].command,
            Some(Command::Multiple(_))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = r#"
tasks:
  - name: a
    command: echo hi
    retries: 3
"#;
        assert!(parse_pipeline_config(yaml).is_err());
    }
}
