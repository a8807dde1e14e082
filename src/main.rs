//! pulp-schedule-migrate CLI entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use pulp_schedule_migrate::cli::commands;
use pulp_schedule_migrate::cli::{handle_error, Cli, Commands};
use pulp_schedule_migrate::infrastructure::config::ConfigLoader;
use pulp_schedule_migrate::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command, cli.config.as_deref(), cli.json).await {
        Ok(code) => code,
        Err(err) => handle_error(err, cli.json),
    }
}

async fn run(command: Commands, config_path: Option<&std::path::Path>, json: bool) -> Result<ExitCode> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    match command {
        Commands::Run { dry_run } => commands::run::execute(dry_run, &config, json).await?,
        Commands::Verify => {
            if !commands::verify::execute(&config, json).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Status => commands::status::execute(&config, json).await?,
        Commands::Import { file } => commands::import::execute(&file, &config, json).await?,
        Commands::Export { file } => commands::export::execute(&file, &config, json).await?,
    }
    Ok(ExitCode::SUCCESS)
}
