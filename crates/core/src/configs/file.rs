use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::options::OptionsOverlay;
use crate::configs::ordered_map::OrderedMap;
use crate::configs::projects::ProjectSpec;
use crate::types::{SubgruntError, SubgruntResult};

pub const DEFAULT_CONFIG_FILE: &str = "subgrunt.yml";

/// Top-level `subgrunt.yml` document
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    /// Options shared by every target
    #[serde(default)]
    pub options: OptionsOverlay,
    /// Named targets, run in declaration order
    #[serde(default)]
    pub targets: OrderedMap<TargetConfig>,
}

/// A named target: either a full definition or just its projects
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum TargetConfig {
    Detailed(TargetDefinition),
    Projects(ProjectSpec),
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetDefinition {
    /// Options overriding the shared ones for this target only
    #[serde(default)]
    pub options: OptionsOverlay,
    pub projects: ProjectSpec,
}

impl TargetConfig {
    pub fn projects(&self) -> &ProjectSpec {
        match self {
            TargetConfig::Detailed(definition) => &definition.projects,
            TargetConfig::Projects(projects) => projects,
        }
    }

    pub fn options(&self) -> Option<&OptionsOverlay> {
        match self {
            TargetConfig::Detailed(definition) => Some(&definition.options),
            TargetConfig::Projects(_) => None,
        }
    }
}

impl ConfigFile {
    /// Look up a target by name
    pub fn target(&self, name: &str) -> SubgruntResult<&TargetConfig> {
        self.targets.get(name).ok_or_else(|| {
            let known = self.targets.keys().collect::<Vec<_>>().join(", ");
            SubgruntError::Target(format!(
                "Target '{}' not found (available: {})",
                name,
                if known.is_empty() { "none" } else { known.as_str() }
            ))
        })
    }
}

pub fn parse_config_file(yaml_str: &str) -> SubgruntResult<ConfigFile> {
    let config: ConfigFile = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

pub fn load_config_file(path: &Path) -> SubgruntResult<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SubgruntError::Config(format!("Failed to read config {}: {}", path.display(), e))
    })?;

    parse_config_file(&content).map_err(|e| {
        SubgruntError::Config(format!("Failed to parse config {}: {}", path.display(), e))
    })
}
