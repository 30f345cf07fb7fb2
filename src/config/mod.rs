//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `GROUPDESK` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use groupdesk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod aggregator;
mod auth;
mod error;
mod server;
mod store;

pub use aggregator::AggregatorConfig;
pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use store::{StoreBackend, StoreConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store configuration (in-memory or PostgreSQL)
    #[serde(default)]
    pub store: StoreConfig,

    /// Bearer token verification
    pub auth: AuthConfig,

    /// Daily message count job
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GROUPDESK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GROUPDESK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GROUPDESK__STORE__URL=...` -> `store.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GROUPDESK")
                    .prefix_separator("__")
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
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.store.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.aggregator.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "GROUPDESK__AUTH__JWT_SECRET",
        "GROUPDESK__SERVER__PORT",
        "GROUPDESK__SERVER__ENVIRONMENT",
        "GROUPDESK__STORE__BACKEND",
        "GROUPDESK__STORE__URL",
        "GROUPDESK__AGGREGATOR__RUN_HOUR_UTC",
    ];

    fn set_minimal_env() {
        env::set_var("GROUPDESK__AUTH__JWT_SECRET", "dev-secret");
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

        let config = result.expect("config should load");
        assert_eq!(config.auth.jwt_secret.expose_secret(), "dev-secret");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.aggregator.run_hour_utc, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GROUPDESK__SERVER__PORT", "3000");
        env::set_var("GROUPDESK__STORE__BACKEND", "postgres");
        env::set_var("GROUPDESK__STORE__URL", "postgres://localhost/groupdesk");
        env::set_var("GROUPDESK__AGGREGATOR__RUN_HOUR_UTC", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.aggregator.run_hour_utc, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_production_requires_strong_secret() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GROUPDESK__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::WeakJwtSecret));
    }
}
