use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::ordered_map::OrderedMap;

/// One task name or an ordered list of task names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TaskList {
    Single(String),
    Multiple(Vec<String>),
}

impl TaskList {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TaskList::Single(task) => vec![task.clone()],
            TaskList::Multiple(tasks) => tasks.clone(),
        }
    }
}

/// The set of sub-projects to build and the tasks to run in each
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ProjectSpec {
    /// Path patterns, each running the `default` task
    Patterns(Vec<String>),
    /// Path pattern to the task(s) to run, in declaration order
    Mapping(ProjectMap),
}

/// Insertion-ordered mapping from path pattern to tasks
pub type ProjectMap = OrderedMap<TaskList>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern_sequence() {
        let spec: ProjectSpec = serde_yaml::from_str("- apps/*\n- libs/core\n").unwrap();
        assert_eq!(
            spec,
            ProjectSpec::Patterns(vec!["apps/*".to_string(), "libs/core".to_string()])
        );
    }

    #[test]
    fn test_parse_mapping_keeps_declaration_order() {
        let spec: ProjectSpec =
            serde_yaml::from_str("zeta: build\nalpha: [lint, test]\nmid: default\n").unwrap();

        let ProjectSpec::Mapping(map) = spec else {
            panic!("expected a mapping");
        };
        let patterns: Vec<&str> = map.iter().map(|(pattern, _)| pattern).collect();
        assert_eq!(patterns, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            map.0[1].1,
            TaskList::Multiple(vec!["lint".to_string(), "test".to_string()])
        );
        assert_eq!(map.0[0].1, TaskList::Single("build".to_string()));
    }

    #[test]
    fn test_non_string_task_is_rejected() {
        let result: Result<ProjectSpec, _> = serde_yaml::from_str("apps: {nested: true}\n");
        assert!(result.is_err());
    }
}
