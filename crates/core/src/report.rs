//! Reporting sink
//!
//! Every attempted stage produces exactly one [`Report`], as does every
//! pattern that could not be expanded.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use colored::*;

use crate::pipeline::Stage;
use crate::process::FailureReason;

/// One ok/fail line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Stage {
        stage: Stage,
        dir: PathBuf,
        /// Command line as run, e.g. `npm install --loglevel=warn`
        command: String,
        failure: Option<FailureReason>,
    },
    InvalidPattern {
        pattern: String,
        reason: String,
    },
}

impl Report {
    pub fn is_failure(&self) -> bool {
        match self {
            Report::Stage { failure, .. } => failure.is_some(),
            Report::InvalidPattern { .. } => true,
        }
    }

    /// Human readable line, without any styling
    pub fn message(&self) -> String {
        match self {
            Report::Stage {
                stage,
                dir,
                command,
                failure,
            } => {
                let dir = dir.display();
                match (stage, failure) {
                    (Stage::Install, None) => format!("Installed dependencies in \"{}\".", dir),
                    (Stage::Install, Some(reason)) => format!(
                        "Failed installing dependencies in \"{}\" ({}).",
                        dir, reason
                    ),
                    (Stage::RunTasks, None) => format!("Ran \"{}\" in \"{}\".", command, dir),
                    (Stage::RunTasks, Some(reason)) => {
                        format!("Failed running \"{}\" in \"{}\" ({}).", command, dir, reason)
                    }
                    (Stage::Prune, None) => {
                        format!("Cleaned development dependencies in \"{}\".", dir)
                    }
                    (Stage::Prune, Some(reason)) => format!(
                        "Failed cleaning development dependencies in \"{}\" ({}).",
                        dir, reason
                    ),
                }
            }
            Report::InvalidPattern { pattern, reason } => format!(
                "The \"{}\" directory is not valid, or does not contain a Gruntfile ({}).",
                pattern, reason
            ),
        }
    }
}

/// Destination for report lines; shared by every pipeline of a run
pub trait Reporter: Send + Sync {
    fn report(&self, report: Report);
}

/// Writes ok lines to stdout and failures as warnings to stderr
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, report: Report) {
        if report.is_failure() {
            eprintln!(
                "{} {}",
                "Warning:".yellow().bold(),
                report.message().yellow()
            );
        } else {
            println!("{} {}", "✓".green().bold(), report.message());
        }
    }
}

/// Keeps every report in arrival order
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<Report>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, report: Report) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }
}
