//! Per-project pipeline
//!
//! `Start -> [Install] -> RunTasks -> [Prune] -> Done`. Stages run strictly in
//! order and the first failing stage ends the pipeline for that project.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::configs::options::Options;
use crate::expand::MatchedProject;
use crate::flags::forward_args;
use crate::normalize::PatternEntry;
use crate::process::{FailureReason, Invocation, ProcessLauncher, Program};
use crate::report::{Report, Reporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Install,
    RunTasks,
    Prune,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Install => "install",
            Stage::RunTasks => "run-tasks",
            Stage::Prune => "prune",
        };
        f.write_str(name)
    }
}

/// Stages to run for every project, in order
pub fn plan_stages(options: &Options) -> Vec<Stage> {
    let mut stages = Vec::with_capacity(3);
    if options.install_dependencies {
        stages.push(Stage::Install);
    }
    stages.push(Stage::RunTasks);
    if options.prune_dependencies {
        stages.push(Stage::Prune);
    }
    stages
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Succeeded,
    FailedAt { stage: Stage, reason: FailureReason },
    /// The pipeline task panicked before finishing
    Aborted(String),
}

/// Result of one project's pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    pub project: MatchedProject,
    pub status: ProjectStatus,
    /// Planned stages that were never attempted because an earlier one failed
    pub skipped: Vec<Stage>,
}

impl ProjectOutcome {
    pub fn is_success(&self) -> bool {
        self.status == ProjectStatus::Succeeded
    }
}

/// Runs the stage sequence for the projects of one pattern
#[derive(Clone)]
pub struct PipelineRunner {
    stages: Vec<Stage>,
    install_tool: String,
    task_args: Vec<String>,
    launcher: Arc<dyn ProcessLauncher>,
    reporter: Arc<dyn Reporter>,
}

impl PipelineRunner {
    pub fn new(
        options: &Options,
        entry: &PatternEntry,
        flags: &[String],
        launcher: Arc<dyn ProcessLauncher>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            stages: plan_stages(options),
            install_tool: options.install_tool.clone(),
            task_args: forward_args(&entry.tasks, flags, options.forward_flags),
            launcher,
            reporter,
        }
    }

    fn invocation(&self, stage: Stage, project: &MatchedProject) -> Invocation {
        let (program, args) = match stage {
            Stage::Install => (
                Program::Executable(self.install_tool.clone()),
                vec!["install".to_string(), "--loglevel=warn".to_string()],
            ),
            Stage::RunTasks => (Program::BuildTool, self.task_args.clone()),
            Stage::Prune => (
                Program::Executable(self.install_tool.clone()),
                vec!["prune".to_string(), "--production".to_string()],
            ),
        };
        Invocation {
            program,
            args,
            cwd: project.dir.clone(),
        }
    }

    /// Drive every planned stage for `project`, reporting each attempted one
    pub async fn run(&self, project: MatchedProject) -> ProjectOutcome {
        for (index, &stage) in self.stages.iter().enumerate() {
            let invocation = self.invocation(stage, &project);
            let command = std::iter::once(self.launcher.display_name(&invocation.program))
                .chain(invocation.args.iter().cloned())
                .collect::<Vec<_>>()
                .join(" ");

            debug!(project = %project, %stage, "starting stage");
            let failure = self.launcher.launch(&invocation).await.failure();

            self.reporter.report(Report::Stage {
                stage,
                dir: project.dir.clone(),
                command,
                failure: failure.clone(),
            });

            if let Some(reason) = failure {
                return ProjectOutcome {
                    project,
                    status: ProjectStatus::FailedAt { stage, reason },
                    skipped: self.stages[index + 1..].to_vec(),
                };
            }
        }

        ProjectOutcome {
            project,
            status: ProjectStatus::Succeeded,
            skipped: Vec::new(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording launcher shared by the pipeline and engine tests

    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::process::{Invocation, ProcessLauncher, ProcessResult, Program};

    /// Records every invocation and fails the ones a rule says should fail
    #[derive(Default)]
    pub struct FakeLauncher {
        pub invocations: Mutex<Vec<Invocation>>,
        /// Exit codes keyed by working directory (any when `None`) and first argument
        pub exit_codes: HashMap<(Option<PathBuf>, String), i32>,
        /// Per-directory delay before the child "exits"
        pub delays: HashMap<PathBuf, Duration>,
        pub default_delay: Duration,
        in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
        pub finished: AtomicUsize,
    }

    impl FakeLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(first_arg: &str, code: i32) -> Self {
            let mut launcher = Self::default();
            launcher
                .exit_codes
                .insert((None, first_arg.to_string()), code);
            launcher
        }

        pub fn fail_in(mut self, dir: &Path, first_arg: &str, code: i32) -> Self {
            self.exit_codes
                .insert((Some(dir.to_path_buf()), first_arg.to_string()), code);
            self
        }

        pub fn delay_in(mut self, dir: &Path, delay: Duration) -> Self {
            self.delays.insert(dir.to_path_buf(), delay);
            self
        }

        pub fn with_default_delay(mut self, delay: Duration) -> Self {
            self.default_delay = delay;
            self
        }

        pub fn invocations(&self) -> Vec<Invocation> {
            self.invocations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessLauncher for FakeLauncher {
        async fn launch(&self, invocation: &Invocation) -> ProcessResult {
            self.invocations.lock().unwrap().push(invocation.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self
                .delays
                .get(&invocation.cwd)
                .copied()
                .unwrap_or(self.default_delay);
            tokio::time::sleep(delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.finished.fetch_add(1, Ordering::SeqCst);

            let first_arg = invocation.args.first().cloned().unwrap_or_default();
            let code = self
                .exit_codes
                .get(&(Some(invocation.cwd.clone()), first_arg.clone()))
                .or_else(|| self.exit_codes.get(&(None, first_arg)))
                .copied()
                .unwrap_or(0);
            ProcessResult::exited(code)
        }

        fn display_name(&self, program: &Program) -> String {
            match program {
                Program::Executable(name) => name.clone(),
                Program::BuildTool => "grunt".to_string(),
            }
        }
    }
}
