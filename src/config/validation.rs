//! Configuration validation logic
//!
//! Each section validates itself; `Settings::validate` stops at the first
//! failure and reports the dotted field path.

use crate::config::error::ConfigError;
use crate::config::settings::{
    AuthConfig, CacheConfig, DatabaseConfig, FileSettings, LoggerSettings, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_SCOPES: &[&str] = &["read", "write"];

const MIN_JWT_SECRET_LEN: usize = 32;

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must be a `postgres://` or `postgresql://` connection string
    /// - Pool bounds must be positive with min <= max
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl AuthConfig {
    /// Validate token and credential settings
    ///
    /// # Validation Rules
    /// - Secret must be at least 32 characters
    /// - Both validities must be positive
    /// - Client id, client secret, username and password must be set
    /// - Scopes must be a non-empty subset of `read`, `write`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "auth.jwt_secret",
                format!(
                    "JWT secret should be at least {} characters.",
                    MIN_JWT_SECRET_LEN
                ),
            ));
        }

        if self.access_token_validity == 0 {
            return Err(ConfigError::validation(
                "auth.access_token_validity",
                "Access token validity must be greater than 0 seconds.",
            ));
        }

        if self.refresh_token_validity == 0 {
            return Err(ConfigError::validation(
                "auth.refresh_token_validity",
                "Refresh token validity must be greater than 0 seconds.",
            ));
        }

        if self.client.id.trim().is_empty() || self.client.secret.is_empty() {
            return Err(ConfigError::validation(
                "auth.client",
                "Client id and secret are required.",
            ));
        }

        if self.client.scopes.is_empty() {
            return Err(ConfigError::validation(
                "auth.client.scopes",
                "At least one scope is required.",
            ));
        }

        if let Some(bad) = self
            .client
            .scopes
            .iter()
            .find(|s| !VALID_SCOPES.contains(&s.as_str()))
        {
            return Err(ConfigError::validation(
                "auth.client.scopes",
                format!(
                    "Unknown scope '{}'. Valid scopes are: {}",
                    bad,
                    VALID_SCOPES.join(", ")
                ),
            ));
        }

        if self.user.username.trim().is_empty() || self.user.password.is_empty() {
            return Err(ConfigError::validation(
                "auth.user",
                "Username and password are required.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// The leading component of `level` must be a plain level; any further
    /// comma-separated directives are left to `EnvFilter`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let head = self.level.split(',').next().unwrap_or_default().trim();
        if !VALID_LOG_LEVELS.contains(&head.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if self.memory.max_size == 0 {
            return Err(ConfigError::validation(
                "cache.memory.max_size",
                "Cache max size must be greater than 0.",
            ));
        }

        if self.memory.ttl_seconds == 0 {
            return Err(ConfigError::validation(
                "cache.memory.ttl_seconds",
                "Cache expiry must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        self.logger.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{ConsoleSettings, MemoryCacheConfig, UserConfig};

    fn valid_settings() -> Settings {
        Settings {
            database: DatabaseConfig {
                url: "postgres://localhost/roster".to_string(),
                ..Default::default()
            },
            auth: AuthConfig {
                user: UserConfig {
                    username: "admin".to_string(),
                    password: "admin-password".to_string(),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_settings_valid() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_server_config_invalid_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "server.port");
    }

    #[test]
    fn test_server_config_valid_port_boundaries() {
        for port in [1, 65535] {
            let config = ServerConfig {
                port,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_database_config_empty_url() {
        let err = DatabaseConfig::default().validate().unwrap_err();
        assert_eq!(field_of(err), "database.url");
    }

    #[test]
    fn test_database_config_rejects_non_postgres_url() {
        let config = DatabaseConfig {
            url: "sqlite://roster.db".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "database.url");
    }

    #[test]
    fn test_database_config_min_exceeds_max() {
        let config = DatabaseConfig {
            url: "postgresql://localhost/roster".to_string(),
            max_connections: 5,
            min_connections: 10,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "database.min_connections"
        );
    }

    #[test]
    fn test_auth_short_secret() {
        let mut settings = valid_settings();
        settings.auth.jwt_secret = "short".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "auth.jwt_secret");
    }

    #[test]
    fn test_auth_zero_validity() {
        let mut settings = valid_settings();
        settings.auth.access_token_validity = 0;
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "auth.access_token_validity"
        );
    }

    #[test]
    fn test_auth_unknown_scope() {
        let mut settings = valid_settings();
        settings.auth.client.scopes = vec!["read".to_string(), "admin".to_string()];
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn test_auth_missing_user_password() {
        let mut settings = valid_settings();
        settings.auth.user.password.clear();
        assert_eq!(field_of(settings.validate().unwrap_err()), "auth.user");
    }

    #[test]
    fn test_logger_directive_level_accepted() {
        let settings = LoggerSettings {
            level: "info,tower_http=debug".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_logger_invalid_level() {
        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_logger_no_outputs() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger");
    }

    #[test]
    fn test_logger_file_enabled_empty_path() {
        let settings = LoggerSettings {
            file: FileSettings {
                enabled: true,
                path: "  ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.path"
        );
    }

    #[test]
    fn test_cache_zero_ttl() {
        let config = CacheConfig {
            enabled: true,
            memory: MemoryCacheConfig {
                ttl_seconds: 0,
                ..Default::default()
            },
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "cache.memory.ttl_seconds"
        );
    }

    #[test]
    fn test_disabled_cache_skips_checks() {
        let config = CacheConfig {
            enabled: false,
            memory: MemoryCacheConfig {
                max_size: 0,
                ttl_seconds: 0,
            },
        };
        assert!(config.validate().is_ok());
    }
}
