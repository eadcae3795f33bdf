//! Merges CLI overrides onto file-based configuration.
//!
//! Precedence, lowest to highest: config files, `ROSTER_*` environment
//! variables, global flags (`--verbose`/`--quiet`), then subcommand flags.

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration selected by `--config` and `--env`.
    ///
    /// # Errors
    /// Returns ConfigError if loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Self::from_loader(Self::loader_for(cli)?)
    }

    pub fn from_loader(loader: ConfigLoader) -> Result<Self, ConfigError> {
        Ok(Self::new(loader.load()?))
    }

    fn loader_for(cli: &Cli) -> Result<ConfigLoader, ConfigError> {
        let mut loader = ConfigLoader::new()?.with_environment(cli.environment());
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        Ok(loader)
    }

    /// Returns a validated copy of the base configuration with CLI overrides
    /// applied.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = (*level).into();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
