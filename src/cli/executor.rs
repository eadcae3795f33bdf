//! Command executor for dispatching CLI commands
//!
//! Runs after parsing and configuration loading. `hash-password` never
//! reaches this point since it needs no configuration.

use super::handlers::{HashPasswordCommandHandler, MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};
use crate::error::AppError;

/// Execute a CLI command with the given settings
///
/// A bare invocation (no subcommand) serves with the merged settings.
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> anyhow::Result<()> {
    validate_command_args(cli)?;

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings, environment)
                .execute(*dry_run)
                .await
        }
        None => {
            ServeCommandHandler::new(settings, environment)
                .execute(false)
                .await
        }
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await?;
            Ok(())
        }
        Some(Commands::HashPassword { password }) => {
            HashPasswordCommandHandler::new(password.as_str()).execute()?;
            Ok(())
        }
    }
}

fn validate_command_args(cli: &Cli) -> Result<(), AppError> {
    cli.validate().map_err(|reason| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason,
    })?;

    if let Some(Commands::Serve {
        host: Some(host),
        port: Some(port),
        ..
    }) = &cli.command
        && *port < 1024
        && host == "0.0.0.0"
    {
        tracing::warn!(port, "Binding to a privileged port on all interfaces");
    }

    if let Some(Commands::Migrate {
        rollback: Some(steps),
        ..
    }) = &cli.command
        && *steps > 50
    {
        tracing::warn!(steps, "Rolling back a large number of migrations");
    }

    Ok(())
}
