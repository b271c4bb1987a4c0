use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use subgrunt_core::configs::{OptionsOverlay, DEFAULT_CONFIG_FILE};

mod commands;
mod logging;

/// subgrunt - Run build pipelines across Gruntfile sub-projects
#[derive(Parser)]
#[command(name = "subgrunt")]
#[command(about = "Install, build and prune every sub-project matched by a set of path patterns")]
#[command(version)]
struct Cli {
    /// Path to the config file; patterns are resolved relative to its directory
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Show debug diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one target, or every target in declaration order
    Run {
        /// Target name from the config file
        target: Option<String>,

        #[command(flatten)]
        overrides: OptionOverrides,

        /// Flags forwarded to every nested build run (after `--`)
        #[arg(last = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },
    /// Show the projects each pattern matches without running anything
    List {
        /// Target name from the config file
        target: Option<String>,
    },
    /// Print the JSON schema of the config file
    Schema,
}

/// Command-line overrides, applied on top of the config file options
#[derive(Args, Debug, Default)]
pub struct OptionOverrides {
    /// Skip the dependency install stage
    #[arg(long)]
    no_install: bool,

    /// Prune development dependencies after the tasks
    #[arg(long)]
    prune: bool,

    /// Executable used for install and prune
    #[arg(long, value_name = "TOOL")]
    install_tool: Option<String>,

    /// Executable used for the nested task run
    #[arg(long, value_name = "TOOL")]
    build_tool: Option<String>,

    /// Do not forward trailing flags to nested runs
    #[arg(long)]
    no_forward_flags: bool,

    /// Maximum simultaneous pipelines per pattern
    #[arg(short = 'j', long, value_name = "N")]
    concurrency_limit: Option<usize>,
}

impl From<&OptionOverrides> for OptionsOverlay {
    fn from(overrides: &OptionOverrides) -> Self {
        Self {
            install_dependencies: overrides.no_install.then_some(false),
            prune_dependencies: overrides.prune.then_some(true),
            install_tool: overrides.install_tool.clone(),
            build_tool: overrides.build_tool.clone(),
            forward_flags: overrides.no_forward_flags.then_some(false),
            concurrency_limit: overrides.concurrency_limit,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run {
            target,
            overrides,
            flags,
        } => {
            commands::run::execute(&cli.config, target.as_deref(), &(&overrides).into(), &flags)
                .await
        }
        Commands::List { target } => commands::list::execute(&cli.config, target.as_deref()),
        Commands::Schema => commands::schema::execute(),
    }
}
