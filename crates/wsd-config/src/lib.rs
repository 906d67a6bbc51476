//! # wsd-config
//!
//! Layered configuration loading for workshop discovery using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`WSD_*` prefix, `__` as separator)
//! 2. Project-level `.wsd/config.toml`
//! 3. User-level `~/.config/wsd/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `WSD_LOCK__LEASE_DURATION_SECS` -> `lock.lease_duration_secs`,
//! `WSD_INTERPRETER__API_KEY` -> `interpreter.api_key`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use wsd_config::WsdConfig;
//!
//! let config = WsdConfig::load_with_dotenv().expect("config");
//! println!("lease: {}s", config.lock.lease_duration_secs);
//! ```

mod analysis;
mod database;
mod error;
mod general;
mod interpreter;
mod lock;

pub use analysis::AnalysisConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use interpreter::InterpreterConfig;
pub use lock::LockConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WsdConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl WsdConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or layer extra providers.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".wsd/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("WSD_").split("__"))
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero_checks = [
            (
                self.lock.lease_duration_secs == 0,
                "lock.lease_duration_secs",
                "a lease must last at least one second",
            ),
            (
                self.analysis.max_corpus_chars == 0,
                "analysis.max_corpus_chars",
                "the reanalysis corpus bound must be positive",
            ),
            (
                self.analysis.interpreter_timeout_secs == 0,
                "analysis.interpreter_timeout_secs",
                "the interpreter timeout must be positive",
            ),
        ];
        match zero_checks.into_iter().find(|(is_zero, _, _)| *is_zero) {
            Some((_, key, reason)) => Err(ConfigError::OutOfRange { key, reason }),
            None => Ok(()),
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wsd").join("config.toml"))
    }
}
