//! # brig-config
//!
//! Layered configuration loading for Brig using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`BRIG_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `.brig/config.toml`
//! 4. User-level `~/.config/brig/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `BRIG_DATABASE__PATH` -> `database.path`,
//! `BRIG_COMMENTS__MAX_DEPTH` -> `comments.max_depth`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use brig_config::BrigConfig;
//!
//! let config = BrigConfig::load_with_dotenv(None).expect("config");
//! println!("listening on {}", config.server.bind);
//! ```

mod audit;
mod comments;
mod database;
mod error;
mod general;
mod server;

pub use audit::AuditConfig;
pub use comments::CommentsConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use server::ServerConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrigConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl BrigConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load_with_dotenv(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(explicit)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".brig/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("BRIG_").split("__"))
    }

    /// Cross-section checks that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.server.socket_addr()?;
        self.comments.validate()?;
        self.general.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("brig").join("config.toml"))
    }
}
