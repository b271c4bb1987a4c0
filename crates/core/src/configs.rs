//! Configuration model
//!
//! Engine options, the project specification of a target, and the
//! `subgrunt.yml` document that names targets.

pub mod file;
pub mod options;
pub mod ordered_map;
pub mod projects;

pub use file::{load_config_file, parse_config_file, ConfigFile, TargetConfig, DEFAULT_CONFIG_FILE};
pub use options::{Options, OptionsOverlay};
pub use ordered_map::OrderedMap;
pub use projects::{ProjectMap, ProjectSpec, TaskList};
