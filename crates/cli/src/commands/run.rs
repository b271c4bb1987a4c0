use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::*;
use subgrunt_core::configs::{load_config_file, Options, OptionsOverlay};
use subgrunt_core::engine::{Engine, RunSummary};
use subgrunt_core::pipeline::ProjectStatus;
use subgrunt_core::process::SystemLauncher;
use subgrunt_core::report::ConsoleReporter;
use tracing::debug;

use super::{base_dir, select_targets};

pub async fn execute(
    config_path: &Path,
    target: Option<&str>,
    overrides: &OptionsOverlay,
    flags: &[String],
) -> Result<()> {
    let config = load_config_file(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    let targets = select_targets(&config, target)?;

    if targets.is_empty() {
        println!("  {}", "No targets defined".dimmed());
        return Ok(());
    }

    let reporter = Arc::new(ConsoleReporter);
    let mut summaries = Vec::with_capacity(targets.len());

    for (name, target_config) in targets {
        let options = Options::resolve(
            [&config.options]
                .into_iter()
                .chain(target_config.options())
                .chain([overrides]),
        )
        .map_err(|e| anyhow::anyhow!("Invalid options for target '{}': {}", name, e))?;
        debug!(target_name = %name, ?options, ?flags, "resolved options");

        println!();
        println!(
            "┌─ {} {}",
            "Running target".bold(),
            name.cyan().bold()
        );
        println!(
            "└─ {} {}",
            "Concurrency limit:".bright_black(),
            options.concurrency_limit
        );

        let engine = Engine::new(
            options.clone(),
            Arc::new(SystemLauncher::new(options.build_tool.clone())),
            reporter.clone(),
        )
        .with_base_dir(base_dir(config_path));

        let summary = engine.run(target_config.projects(), flags).await;
        summaries.push((name, summary));
    }

    println!();
    let mut failed = 0;
    for (name, summary) in &summaries {
        failed += print_summary(name, summary);
    }

    if failed > 0 {
        anyhow::bail!("{} pattern(s) or project(s) failed", failed);
    }

    println!(
        "{} {}",
        "✓".green().bold(),
        "All sub-projects completed successfully!".green().bold()
    );
    Ok(())
}

/// Print one target's outcome and return how many patterns and projects failed
fn print_summary(name: &str, summary: &RunSummary) -> usize {
    let projects = summary.projects().count();
    let invalid: Vec<&str> = summary.invalid_patterns().collect();
    let failed: Vec<_> = summary.failed_projects().collect();

    println!(
        "{} {} {}",
        name.bold(),
        format!("{} project(s),", projects).bright_black(),
        if failed.is_empty() && invalid.is_empty() {
            "ok".green()
        } else {
            format!("{} failed", failed.len() + invalid.len()).red()
        }
    );

    for pattern in &invalid {
        println!("  {} {}", "✗".red(), format!("{} (invalid pattern)", pattern).red());
    }

    for outcome in &failed {
        let detail = match &outcome.status {
            ProjectStatus::FailedAt { stage, reason } => format!("{} {}", stage, reason),
            ProjectStatus::Aborted(reason) => format!("aborted: {}", reason),
            ProjectStatus::Succeeded => continue,
        };
        let skipped = if outcome.skipped.is_empty() {
            String::new()
        } else {
            let stages: Vec<String> = outcome.skipped.iter().map(|s| s.to_string()).collect();
            format!(", skipped {}", stages.join(", "))
        };
        println!(
            "  {} {} {}",
            "✗".red(),
            outcome.project.to_string().red(),
            format!("({}{})", detail, skipped).bright_black()
        );
    }

    invalid.len() + failed.len()
}
