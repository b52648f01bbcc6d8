//! # va-config
//!
//! Layered configuration loading for the Value Analyst client using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VALAN_*` prefix, `__` as separator)
//! 2. Project-level `.valan/config.toml`
//! 3. User-level `~/.config/valan/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VALAN_BACKEND__BASE_URL` -> `backend.base_url`,
//! `VALAN_POLLING__INTERVAL_MS` -> `polling.interval_ms`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use va_config::ValanConfig;
//!
//! let config = ValanConfig::load_with_dotenv().expect("config");
//! println!("backend: {}", config.backend.normalized_base_url());
//! ```

mod backend;
mod error;
mod general;
mod polling;

pub use backend::{BackendConfig, DEFAULT_BASE_URL};
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use polling::PollingConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValanConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ValanConfig {
    /// Load and validate configuration from TOML files and environment
    /// variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env`
    /// support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".valan/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("VALAN_").split("__"))
    }

    /// Check cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.polling.validate()
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("valan").join("config.toml"))
    }
}
