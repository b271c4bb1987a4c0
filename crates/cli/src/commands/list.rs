use std::path::Path;

use anyhow::Result;
use colored::*;
use subgrunt_core::configs::load_config_file;
use subgrunt_core::engine::plan_projects;

use super::{base_dir, select_targets};

pub fn execute(config_path: &Path, target: Option<&str>) -> Result<()> {
    let config = load_config_file(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    let targets = select_targets(&config, target)?;

    if targets.is_empty() {
        println!("  {}", "No targets defined".dimmed());
        return Ok(());
    }

    for (name, target_config) in targets {
        println!("{}", name.bold().underline());

        for (entry, projects) in plan_projects(target_config.projects(), base_dir(config_path)) {
            println!(
                "  {} {}",
                entry.pattern.blue().bold(),
                format!("[{}]", entry.tasks.join(", ")).dimmed()
            );

            match projects {
                Ok(projects) => {
                    for project in projects {
                        println!("    {}", project);
                    }
                }
                Err(e) => println!("    {}", e.to_string().yellow()),
            }
        }
    }

    Ok(())
}
