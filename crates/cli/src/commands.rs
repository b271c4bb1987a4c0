pub mod list;
pub mod run;
pub mod schema;

use std::path::Path;

use anyhow::Result;
use subgrunt_core::configs::{ConfigFile, TargetConfig};

/// The named target, or every target in declaration order
fn select_targets<'a>(
    config: &'a ConfigFile,
    target: Option<&'a str>,
) -> Result<Vec<(&'a str, &'a TargetConfig)>> {
    match target {
        Some(name) => Ok(vec![(name, config.target(name)?)]),
        None => Ok(config.targets.iter().collect()),
    }
}

/// Directory that relative patterns are resolved against
fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or(Path::new(""))
}
