//! Longread CLI - Analyze documents too long for a single model call.

use clap::Parser;
use longread_cli::commands;
use longread_cli::config::OutputFormat;
use longread_cli::cli::CliFormat;
use longread_cli::{Cli, Command, Config, Formatter};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> longread_cli::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the analysis
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    match cli.command {
        // Config commands must work even when the file is missing or broken
        Command::Config(args) => {
            let formatter = Formatter::new(OutputFormat::Table, !cli.no_color);
            commands::execute_config(args, &path, &formatter).await?
        }
        Command::Analyze(args) => {
            let (config, formatter) = load(&path, cli.format, cli.no_color)?;
            commands::execute_analyze(args, &config, &formatter).await?
        }
        Command::Digest(args) => {
            let (config, formatter) = load(&path, cli.format, cli.no_color)?;
            commands::execute_digest(args, &config, &formatter).await?
        }
        Command::Split(args) => {
            let (config, formatter) = load(&path, cli.format, cli.no_color)?;
            commands::execute_split(args, &config, &formatter).await?
        }
        Command::Prompts(args) => {
            let (config, formatter) = load(&path, cli.format, cli.no_color)?;
            commands::execute_prompts(args, &config, &formatter).await?
        }
    }

    Ok(())
}

/// Load the config file and build the formatter from it and the flags.
fn load(
    path: &Path,
    format: Option<CliFormat>,
    no_color: bool,
) -> longread_cli::Result<(Config, Formatter)> {
    let config = Config::load_from(path)?;
    let formatter = Formatter::new(config.output_format(format), config.color_enabled(no_color));
    Ok((config, formatter))
}
