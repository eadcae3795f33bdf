//! CLI module for roster-rs
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command execution and validation

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::Settings;
use crate::logger::init_logger;
use handlers::HashPasswordCommandHandler;

/// Load configuration files for the selected environment and apply CLI overrides.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let settings = ConfigurationMerger::from_cli(cli)
        .context("Failed to load configuration")?
        .merge_cli_args(cli)
        .context("Invalid configuration")?;
    Ok(settings)
}

/// Initialize the global subscriber from the `logger` section.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Invalid logger configuration")?;
    init_logger(logger_config)
}

/// Entry point shared by the binary.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.validate().map_err(anyhow::Error::msg)?;

    if let Some(Commands::HashPassword { password }) = &cli.command {
        HashPasswordCommandHandler::new(password.as_str()).execute()?;
        return Ok(());
    }

    let environment = cli.environment();
    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    execute_command(&cli, settings, environment).await
}
