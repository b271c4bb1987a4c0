//! External process invocation
//!
//! Children inherit the parent's standard streams; nothing is captured.
//! [`ProcessLauncher`] is the seam between the pipeline and the operating
//! system so pipelines can be driven by a recording launcher in tests.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// What to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    /// A named executable, resolved through `PATH` (install and prune stages)
    Executable(String),
    /// The build tool itself, resolved by the launcher (nested task runs)
    BuildTool,
}

/// A single child process to run to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: Program,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// Outcome of running an [`Invocation`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, absent when the child never started or was killed by a signal
    pub exit_code: Option<i32>,
    pub spawn_error: Option<String>,
}

impl ProcessResult {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            spawn_error: None,
        }
    }

    pub fn signaled() -> Self {
        Self::default()
    }

    pub fn spawn_failed(error: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            spawn_error: Some(error.into()),
        }
    }

    /// Why this result counts as a failure, or `None` when it succeeded
    pub fn failure(&self) -> Option<FailureReason> {
        if let Some(error) = &self.spawn_error {
            return Some(FailureReason::SpawnFailed(error.clone()));
        }
        match self.exit_code {
            Some(0) => None,
            Some(code) => Some(FailureReason::ExitCode(code)),
            None => Some(FailureReason::Signaled),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }
}

/// Why a stage failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    SpawnFailed(String),
    ExitCode(i32),
    Signaled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::SpawnFailed(error) => write!(f, "failed to start: {}", error),
            FailureReason::ExitCode(code) => write!(f, "exited with code {}", code),
            FailureReason::Signaled => write!(f, "terminated by signal"),
        }
    }
}

#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run the invocation to completion
    async fn launch(&self, invocation: &Invocation) -> ProcessResult;

    /// Executable name shown in report lines for `program`
    fn display_name(&self, program: &Program) -> String;
}

/// Launches real child processes with inherited standard streams
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    build_tool: String,
}

impl SystemLauncher {
    pub fn new(build_tool: impl Into<String>) -> Self {
        Self {
            build_tool: build_tool.into(),
        }
    }

    fn executable<'a>(&'a self, program: &'a Program) -> &'a str {
        match program {
            Program::Executable(name) => name,
            Program::BuildTool => &self.build_tool,
        }
    }
}

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn launch(&self, invocation: &Invocation) -> ProcessResult {
        let executable = self.executable(&invocation.program);
        debug!(
            executable,
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "spawning"
        );

        let status = Command::new(executable)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await;

        match status {
            Ok(status) => match status.code() {
                Some(code) => ProcessResult::exited(code),
                None => ProcessResult::signaled(),
            },
            Err(e) => ProcessResult::spawn_failed(e.to_string()),
        }
    }

    fn display_name(&self, program: &Program) -> String {
        self.executable(program).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        assert!(ProcessResult::exited(0).is_success());
        assert_eq!(
            ProcessResult::exited(2).failure(),
            Some(FailureReason::ExitCode(2))
        );
        assert_eq!(
            ProcessResult::exited(-1).failure(),
            Some(FailureReason::ExitCode(-1))
        );
        // Windows reports crash statuses such as access violations as negative codes
        assert_eq!(
            ProcessResult::exited(0xC000_0005_u32 as i32).failure(),
            Some(FailureReason::ExitCode(0xC000_0005_u32 as i32))
        );
        assert_eq!(
            ProcessResult::signaled().failure(),
            Some(FailureReason::Signaled)
        );
        assert!(matches!(
            ProcessResult::spawn_failed("not found").failure(),
            Some(FailureReason::SpawnFailed(_))
        ));
    }

    #[test]
    fn test_spawn_error_wins_over_exit_code() {
        let result = ProcessResult {
            exit_code: Some(0),
            spawn_error: Some("boom".to_string()),
        };
        assert!(!result.is_success());
    }

    #[test]
    fn test_build_tool_resolution() {
        let launcher = SystemLauncher::new("/opt/bin/grunt");
        assert_eq!(launcher.display_name(&Program::BuildTool), "/opt/bin/grunt");
        assert_eq!(
            launcher.display_name(&Program::Executable("npm".to_string())),
            "npm"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let launcher = SystemLauncher::new("grunt");

        let ok = launcher
            .launch(&Invocation {
                program: Program::Executable("sh".to_string()),
                args: vec!["-c".to_string(), "exit 0".to_string()],
                cwd: temp_dir.path().to_path_buf(),
            })
            .await;
        assert_eq!(ok, ProcessResult::exited(0));

        let failed = launcher
            .launch(&Invocation {
                program: Program::Executable("sh".to_string()),
                args: vec!["-c".to_string(), "exit 3".to_string()],
                cwd: temp_dir.path().to_path_buf(),
            })
            .await;
        assert_eq!(failed, ProcessResult::exited(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_child_runs_in_working_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let launcher = SystemLauncher::new("grunt");

        let result = launcher
            .launch(&Invocation {
                program: Program::Executable("sh".to_string()),
                args: vec!["-c".to_string(), "touch marker".to_string()],
                cwd: temp_dir.path().to_path_buf(),
            })
            .await;

        assert!(result.is_success());
        assert!(temp_dir.path().join("marker").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_killed_child_is_signaled_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let launcher = SystemLauncher::new("grunt");

        let result = launcher
            .launch(&Invocation {
                program: Program::Executable("sh".to_string()),
                args: vec!["-c".to_string(), "kill -9 $$".to_string()],
                cwd: temp_dir.path().to_path_buf(),
            })
            .await;

        assert_eq!(result, ProcessResult::signaled());
        assert_eq!(result.failure(), Some(FailureReason::Signaled));
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let launcher = SystemLauncher::new("subgrunt-test-no-such-build-tool");

        let result = launcher
            .launch(&Invocation {
                program: Program::BuildTool,
                args: vec!["default".to_string()],
                cwd: temp_dir.path().to_path_buf(),
            })
            .await;

        assert!(result.spawn_error.is_some());
        assert!(!result.is_success());
    }
}
