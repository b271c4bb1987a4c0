use anyhow::Result;
use subgrunt_core::configs::ConfigFile;

pub fn execute() -> Result<()> {
    let schema = schemars::schema_for!(ConfigFile);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
