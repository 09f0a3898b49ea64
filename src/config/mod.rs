//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COUNSEL_SWARM` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use counsel_swarm::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Sessions stored in {:?}", config.storage.backend);
//! ```

mod ai;
mod counseling;
mod error;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use counseling::CounselingConfig;
pub use error::{ConfigError, ValidationError};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (Anthropic/OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// History window, fan-out width and call pacing
    #[serde(default)]
    pub counseling: CounselingConfig,

    /// Session store backend
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COUNSEL_SWARM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COUNSEL_SWARM__AI__ANTHROPIC_API_KEY=...` -> `ai.anthropic_api_key`
    /// - `COUNSEL_SWARM__STORAGE__BACKEND=file` -> `storage.backend`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COUNSEL_SWARM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid. A
    /// missing key for the primary provider is `MissingRequired`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.counseling.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "COUNSEL_SWARM__AI__ANTHROPIC_API_KEY",
        "COUNSEL_SWARM__AI__PRIMARY_PROVIDER",
        "COUNSEL_SWARM__COUNSELING__MAX_HISTORY_TURNS",
        "COUNSEL_SWARM__STORAGE__BACKEND",
        "COUNSEL_SWARM__STORAGE__PATH",
        "COUNSEL_SWARM__LOG_FORMAT",
    ];

    fn set_minimal_env() {
        env::set_var("COUNSEL_SWARM__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let key = config.ai.anthropic_api_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "sk-ant-xxx");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.counseling.max_history_turns, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("COUNSEL_SWARM__COUNSELING__MAX_HISTORY_TURNS", "4");
        env::set_var("COUNSEL_SWARM__STORAGE__BACKEND", "file");
        env::set_var("COUNSEL_SWARM__STORAGE__PATH", "/tmp/sessions");
        env::set_var("COUNSEL_SWARM__LOG_FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.counseling.max_history_turns, 4);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path.to_str(), Some("/tmp/sessions"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_primary_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("COUNSEL_SWARM__AI__PRIMARY_PROVIDER", "openai");
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        ));
    }
}
