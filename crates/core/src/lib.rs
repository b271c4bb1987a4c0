//! subgrunt Core Library
//!
//! This is the core library for the subgrunt build orchestrator. It runs a
//! build pipeline (install, tasks, prune) in every sub-project matched by a
//! set of path patterns, with a bounded number of projects in flight per
//! pattern.
//!
//! ## Architecture
//!
//! - [`engine`] - Runs a project specification end to end and aggregates outcomes
//! - [`normalize`] - Project specification to ordered pattern entries
//! - [`expand`] - Pattern to project directories containing a `Gruntfile.js`
//! - [`limiter`] - Bounded concurrent execution
//! - [`pipeline`] - Per-project stage machine
//! - [`process`] - Child process invocation
//! - [`flags`] - Argument list for nested build runs
//! - [`report`] - Reporting sink
//! - [`configs`] - Options, project specification and config file parsing
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use subgrunt_core::configs::{load_config_file, Options};
//! use subgrunt_core::engine::Engine;
//! use subgrunt_core::process::SystemLauncher;
//! use subgrunt_core::report::ConsoleReporter;
//!
//! # async fn example() -> subgrunt_core::types::SubgruntResult<()> {
//! let config = load_config_file(Path::new("subgrunt.yml"))?;
//! let target = config.target("apps")?;
//! let options = Options::resolve([&config.options].into_iter().chain(target.options()))?;
//!
//! let engine = Engine::new(
//!     options.clone(),
//!     Arc::new(SystemLauncher::new(options.build_tool.clone())),
//!     Arc::new(ConsoleReporter),
//! );
//! let summary = engine.run(target.projects(), &[]).await;
//! println!("{} failed", summary.failed_projects().count());
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod engine;
pub mod expand;
pub mod flags;
pub mod limiter;
pub mod normalize;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod types;

// Re-export the main types for easier usage
pub use engine::{Engine, RunSummary};
pub use types::{SubgruntError, SubgruntResult};
