//! Project specification normalization
//!
//! Turns either form of [`ProjectSpec`] into an ordered list of
//! [`PatternEntry`] values, each carrying a non-empty task list.

use crate::configs::projects::ProjectSpec;

/// Task run when a pattern names no tasks
pub const DEFAULT_TASK: &str = "default";

/// A path pattern together with the tasks to run in every project it matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub pattern: String,
    pub tasks: Vec<String>,
}

impl PatternEntry {
    pub fn new(pattern: impl Into<String>, tasks: Vec<String>) -> Self {
        let tasks = if tasks.is_empty() {
            vec![DEFAULT_TASK.to_string()]
        } else {
            tasks
        };
        Self {
            pattern: pattern.into(),
            tasks,
        }
    }
}

/// Normalize a project specification into pattern entries, preserving declaration order.
///
/// Never fails; malformed patterns surface later during expansion.
pub fn normalize_projects(spec: &ProjectSpec) -> Vec<PatternEntry> {
    match spec {
        ProjectSpec::Patterns(patterns) => patterns
            .iter()
            .map(|pattern| PatternEntry::new(pattern.as_str(), Vec::new()))
            .collect(),
        ProjectSpec::Mapping(map) => map
            .iter()
            .map(|(pattern, tasks)| PatternEntry::new(pattern, tasks.to_vec()))
            .collect(),
    }
}
