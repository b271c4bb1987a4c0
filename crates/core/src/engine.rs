//! Orchestration engine
//!
//! The [`Engine`] runs a project specification end to end: every pattern is
//! expanded and scheduled independently, with its own concurrency limit, and
//! [`Engine::run`] resolves exactly once after all of them have settled.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use subgrunt_core::configs::{Options, ProjectSpec};
//! use subgrunt_core::engine::Engine;
//! use subgrunt_core::process::SystemLauncher;
//! use subgrunt_core::report::ConsoleReporter;
//!
//! # async fn example() {
//! let options = Options::default();
//! let engine = Engine::new(
//!     options.clone(),
//!     Arc::new(SystemLauncher::new(options.build_tool.clone())),
//!     Arc::new(ConsoleReporter),
//! );
//! let spec = ProjectSpec::Patterns(vec!["apps/*".to_string()]);
//! let summary = engine.run(&spec, &[]).await;
//! if summary.has_failures() {
//!     std::process::exit(1);
//! }
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::configs::options::Options;
use crate::configs::projects::ProjectSpec;
use crate::expand::{expand_pattern, MatchedProject};
use crate::limiter::run_limited;
use crate::normalize::{normalize_projects, PatternEntry};
use crate::pipeline::{PipelineRunner, ProjectOutcome, ProjectStatus};
use crate::process::ProcessLauncher;
use crate::report::{Report, Reporter};
use crate::types::{SubgruntError, SubgruntResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternResult {
    /// The pattern matched no project; nothing was scheduled for it
    Invalid { reason: String },
    /// Outcomes of every matched project, in sorted project order
    Completed(Vec<ProjectOutcome>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternOutcome {
    pub pattern: String,
    pub result: PatternResult,
}

/// Everything a run produced, in pattern declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub patterns: Vec<PatternOutcome>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.invalid_patterns().next().is_some() || self.failed_projects().next().is_some()
    }

    pub fn invalid_patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().filter_map(|outcome| match outcome.result {
            PatternResult::Invalid { .. } => Some(outcome.pattern.as_str()),
            PatternResult::Completed(_) => None,
        })
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectOutcome> {
        self.patterns
            .iter()
            .filter_map(|outcome| match &outcome.result {
                PatternResult::Completed(projects) => Some(projects.iter()),
                PatternResult::Invalid { .. } => None,
            })
            .flatten()
    }

    pub fn failed_projects(&self) -> impl Iterator<Item = &ProjectOutcome> {
        self.projects().filter(|outcome| !outcome.is_success())
    }
}

/// Shared state handed to every pattern's task
#[derive(Clone)]
struct PatternContext {
    options: Options,
    base_dir: PathBuf,
    flags: Arc<[String]>,
    launcher: Arc<dyn ProcessLauncher>,
    reporter: Arc<dyn Reporter>,
}

pub struct Engine {
    options: Options,
    base_dir: PathBuf,
    launcher: Arc<dyn ProcessLauncher>,
    reporter: Arc<dyn Reporter>,
}

impl Engine {
    pub fn new(
        options: Options,
        launcher: Arc<dyn ProcessLauncher>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            options,
            base_dir: PathBuf::new(),
            launcher,
            reporter,
        }
    }

    /// Directory relative patterns are resolved against (the working directory by default)
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Run every pattern of `spec`, forwarding `flags` to nested task runs.
    ///
    /// Resolves once all patterns have settled; immediately when there are none.
    pub async fn run(&self, spec: &ProjectSpec, flags: &[String]) -> RunSummary {
        let entries = normalize_projects(spec);
        if entries.is_empty() {
            return RunSummary::default();
        }

        let context = PatternContext {
            options: self.options.clone(),
            base_dir: self.base_dir.clone(),
            flags: flags.into(),
            launcher: self.launcher.clone(),
            reporter: self.reporter.clone(),
        };

        let patterns: Vec<String> = entries.iter().map(|entry| entry.pattern.clone()).collect();
        let handles: Vec<_> = entries
            .into_iter()
            .map(|entry| tokio::spawn(run_pattern(entry, context.clone())))
            .collect();

        let mut summary = RunSummary::default();
        for (pattern, handle) in patterns.into_iter().zip(handles) {
            let outcome = handle.await.unwrap_or_else(|e| PatternOutcome {
                pattern,
                result: PatternResult::Invalid {
                    reason: format!("pattern task failed: {}", e),
                },
            });
            summary.patterns.push(outcome);
        }

        info!(
            patterns = summary.patterns.len(),
            projects = summary.projects().count(),
            failed = summary.failed_projects().count(),
            "run complete"
        );
        summary
    }
}

async fn run_pattern(entry: PatternEntry, context: PatternContext) -> PatternOutcome {
    let pattern = entry.pattern.clone();
    let base_dir = context.base_dir.clone();
    let expanded = tokio::task::spawn_blocking(move || expand_pattern(&pattern, &base_dir))
        .await
        .unwrap_or_else(|e| {
            Err(SubgruntError::InvalidPattern {
                pattern: entry.pattern.clone(),
                reason: e.to_string(),
            })
        });

    let projects = match expanded {
        Ok(projects) => projects,
        Err(e) => {
            let reason = match e {
                SubgruntError::InvalidPattern { reason, .. } => reason,
                other => other.to_string(),
            };
            context.reporter.report(Report::InvalidPattern {
                pattern: entry.pattern.clone(),
                reason: reason.clone(),
            });
            return PatternOutcome {
                pattern: entry.pattern,
                result: PatternResult::Invalid { reason },
            };
        }
    };

    debug!(
        pattern = %entry.pattern,
        projects = projects.len(),
        limit = context.options.concurrency_limit,
        "scheduling pipelines"
    );

    let runner = PipelineRunner::new(
        &context.options,
        &entry,
        &context.flags,
        context.launcher.clone(),
        context.reporter.clone(),
    );

    let results = run_limited(
        projects.clone(),
        context.options.concurrency_limit,
        |project| {
            let runner = runner.clone();
            async move { runner.run(project).await }
        },
    )
    .await;

    let outcomes = results
        .into_iter()
        .zip(projects)
        .map(|(result, project)| {
            result.unwrap_or_else(|e| ProjectOutcome {
                project,
                status: ProjectStatus::Aborted(e.to_string()),
                skipped: Vec::new(),
            })
        })
        .collect();

    PatternOutcome {
        pattern: entry.pattern,
        result: PatternResult::Completed(outcomes),
    }
}

/// Expand every pattern of `spec` without running anything
pub fn plan_projects(
    spec: &ProjectSpec,
    base_dir: &Path,
) -> Vec<(PatternEntry, SubgruntResult<Vec<MatchedProject>>)> {
    normalize_projects(spec)
        .into_iter()
        .map(|entry| {
            let projects = expand_pattern(&entry.pattern, base_dir);
            (entry, projects)
        })
        .collect()
}
