//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub async fn execute_config(args: ConfigArgs, path: &Path, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => init_config(path, force, formatter),
        ConfigAction::Show => {
            let config = Config::load_from(path)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Write the default configuration.
fn init_config(path: &Path, force: bool, formatter: &Formatter) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save_to(path)?;
    println!(
        "{}",
        formatter.success(&format!("Wrote default configuration to {}", path.display()))
    );
    Ok(())
}
