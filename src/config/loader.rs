//! Configuration loader for roster-rs
//!
//! `ConfigLoader` resolves where configuration lives and layers the sources
//! in precedence order before deserializing into `Settings`.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::{DEV_JWT_SECRET, Settings};

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "ROSTER_CONFIG_DIR";

/// Environment variable for a single configuration file
const CONFIG_FILE_ENV: &str = "ROSTER_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "ROSTER";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `ROSTER_*` environment variables
///
/// When a single configuration file is set, it replaces steps 1-3.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `ROSTER_CONFIG_DIR`, `ROSTER_CONFIG_FILE` and
    /// `ROSTER_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `ROSTER_CONFIG_DIR` and `ROSTER_CONFIG_FILE`
    /// are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::EnvVarError(format!(
                "{} and {} cannot both be set. Use {} for layered configuration or {} for a single configuration file.",
                CONFIG_DIR_ENV, CONFIG_FILE_ENV, CONFIG_DIR_ENV, CONFIG_FILE_ENV
            )));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load from the given directory instead of the environment-selected one.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self.config_file = None;
        self
    }

    /// Load only this file (plus environment variables).
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load configuration from all sources and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` (or the single config file) is not found
    /// - parsing or deserialization fails
    /// - validation fails, including the development JWT secret in production
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings: Settings = self.build_config()?.try_deserialize()?;

        settings.validate()?;

        if self.environment.is_production() && settings.auth.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::validation(
                "auth.jwt_secret",
                "The development JWT secret cannot be used in production.",
            ));
        }

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.config_file {
            Some(config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // ROSTER_SERVER__PORT -> server.port
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("auth.client.scopes"),
        );

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()));
        }

        Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(required)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests mutate process environment variables
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const BASE: &str = r#"
[database]
url = "postgres://localhost/roster"

[auth.user]
username = "admin"
password = "admin-password"
"#;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores touched environment variables on drop
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            let mut guard = Self {
                vars_to_restore: Vec::new(),
            };
            for key in [CONFIG_DIR_ENV, CONFIG_FILE_ENV, AppEnvironment::ENV_VAR] {
                guard.remove(key);
            }
            guard
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_config_loader_new_default() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::new();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        let err = ConfigLoader::new().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ROSTER_CONFIG_DIR"));
        assert!(msg.contains("ROSTER_CONFIG_FILE"));
    }

    #[test]
    fn test_config_loader_environment_from_env() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(AppEnvironment::ENV_VAR, "staging");

        let loader = ConfigLoader::new().unwrap();
        assert_eq!(loader.environment(), AppEnvironment::Staging);
    }

    #[test]
    fn test_load_missing_default_toml() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[]);

        let err = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(path) if path.contains("default.toml")));
    }

    #[test]
    fn test_load_default_toml_only() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[("default.toml", BASE)]);

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .load()
            .unwrap();
        assert_eq!(settings.database.url, "postgres://localhost/roster");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.cache.memory.ttl_seconds, 60);
    }

    #[test]
    fn test_load_full_precedence_chain() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        let default = format!("{BASE}\n[server]\nport = 3001\nhost = \"0.0.0.0\"\n");
        let temp_dir = setup_config_dir(&[
            ("default.toml", default.as_str()),
            ("test.toml", "[server]\nport = 3002\n[cache.memory]\nttl_seconds = 5\n"),
            ("local.toml", "[cache.memory]\nttl_seconds = 7\n"),
        ]);
        env.set("ROSTER_SERVER__PORT", "3003");

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .with_environment(AppEnvironment::Test)
            .load()
            .unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 3003);
        assert_eq!(settings.cache.memory.ttl_seconds, 7);
    }

    #[test]
    fn test_env_var_scope_list() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[("default.toml", BASE)]);
        env.set("ROSTER_AUTH__CLIENT__SCOPES", "read");

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .load()
            .unwrap();
        assert_eq!(settings.auth.client.scopes, vec!["read"]);
    }

    #[test]
    fn test_load_single_file_mode() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::new();
        let custom = format!("{BASE}\n[cache]\nenabled = false\n");
        let temp_dir = setup_config_dir(&[
            ("custom.toml", custom.as_str()),
            ("default.toml", "[server]\nport = 1\n"),
        ]);

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("custom.toml"))
            .load()
            .unwrap();
        assert!(!settings.cache.enabled);
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::new();
        let default = format!("{BASE}\n[cache.memory]\nttl_seconds = 0\n");
        let temp_dir = setup_config_dir(&[("default.toml", default.as_str())]);

        let err = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .load()
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "cache.memory.ttl_seconds")
        );
    }

    #[test]
    fn test_production_refuses_dev_secret() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[("default.toml", BASE)]);

        let err = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .with_environment(AppEnvironment::Production)
            .load()
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "auth.jwt_secret")
        );
    }

    #[test]
    fn test_bundled_default_config_loads() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::new();
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_dir(dir)
            .with_environment(AppEnvironment::Test)
            .load()
            .unwrap();
        assert_eq!(settings.application.name, "roster-rs");
        assert_eq!(settings.cache.memory.ttl_seconds, 5);
        assert_eq!(settings.auth.access_token_validity, 2000);
    }
}
