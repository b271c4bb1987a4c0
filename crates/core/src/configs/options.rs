use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{SubgruntError, SubgruntResult};

pub const DEFAULT_INSTALL_TOOL: &str = "npm";
pub const DEFAULT_BUILD_TOOL: &str = "grunt";

/// Fully resolved engine options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub install_dependencies: bool,
    pub prune_dependencies: bool,
    pub install_tool: String,
    pub build_tool: String,
    pub forward_flags: bool,
    /// Maximum number of pipelines in flight for a single pattern
    pub concurrency_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            install_dependencies: true,
            prune_dependencies: false,
            install_tool: DEFAULT_INSTALL_TOOL.to_string(),
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            forward_flags: true,
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

/// Logical CPU count, but never below two
pub fn default_concurrency_limit() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(2)
}

/// A partial set of options as written in a config file or given on the command line.
///
/// The legacy grunt-subgrunt option names are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionsOverlay {
    /// Run `<installTool> install --loglevel=warn` before the tasks
    #[serde(alias = "npmInstall")]
    pub install_dependencies: Option<bool>,
    /// Run `<installTool> prune --production` after the tasks
    #[serde(alias = "npmClean")]
    pub prune_dependencies: Option<bool>,
    /// Executable used for the install and prune stages
    #[serde(alias = "npmPath")]
    pub install_tool: Option<String>,
    /// Executable used for the nested task run
    pub build_tool: Option<String>,
    /// Append the current invocation's flags to the nested task run
    #[serde(alias = "passGruntFlags")]
    pub forward_flags: Option<bool>,
    /// Maximum simultaneous pipelines per pattern
    #[serde(alias = "limit")]
    #[schemars(range(min = 1))]
    pub concurrency_limit: Option<usize>,
}

impl Options {
    /// Apply the set fields of `overlay` on top of these options
    pub fn apply(mut self, overlay: &OptionsOverlay) -> SubgruntResult<Self> {
        if let Some(value) = overlay.install_dependencies {
            self.install_dependencies = value;
        }
        if let Some(value) = overlay.prune_dependencies {
            self.prune_dependencies = value;
        }
        if let Some(value) = &overlay.install_tool {
            self.install_tool = value.clone();
        }
        if let Some(value) = &overlay.build_tool {
            self.build_tool = value.clone();
        }
        if let Some(value) = overlay.forward_flags {
            self.forward_flags = value;
        }
        if let Some(value) = overlay.concurrency_limit {
            if value == 0 {
                return Err(SubgruntError::Config(
                    "concurrencyLimit must be a positive integer".to_string(),
                ));
            }
            self.concurrency_limit = value;
        }
        Ok(self)
    }

    /// Resolve options from defaults and a sequence of overlays, later overlays winning
    pub fn resolve<'a>(
        overlays: impl IntoIterator<Item = &'a OptionsOverlay>,
    ) -> SubgruntResult<Self> {
        overlays
            .into_iter()
            .try_fold(Self::default(), |options, overlay| options.apply(overlay))
    }
}
