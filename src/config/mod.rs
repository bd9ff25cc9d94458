//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `ORATIO__` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use oratio::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod cache;
mod error;
mod judge;
mod server;

pub use cache::CacheConfig;
pub use error::{ConfigError, ValidationError};
pub use judge::JudgeConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache configuration (Redis URL, TTL)
    #[serde(default)]
    pub cache: CacheConfig,

    /// AI judge configuration (API key, model, endpoint)
    #[serde(default)]
    pub judge: JudgeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables
    /// with the `ORATIO` prefix using `__` to separate nested values:
    ///
    /// - `ORATIO__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `ORATIO__CACHE__REDIS_URL=redis://...` -> `cache.redis_url = ...`
    /// - `ORATIO__JUDGE__API_KEY=sk-...` -> `judge.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ORATIO")
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
        self.cache.validate()?;
        self.judge.validate()?;
        Ok(())
    }
}
