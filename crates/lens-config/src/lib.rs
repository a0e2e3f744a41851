//! # lens-config
//!
//! Layered configuration loading for Label Lens using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LENS_*` prefix, `__` as separator)
//! 2. Externally supplied overrides ([`LensConfig::load_with_env_overrides`])
//! 3. Project-level `.lens/config.toml`
//! 4. User-level `~/.config/lens/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LENS_GEMINI__API_KEY` -> `gemini.api_key`,
//! `LENS_SCAN__COOLDOWN_MS` -> `scan.cooldown_ms`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use lens_config::LensConfig;
//!
//! let config = LensConfig::load_with_dotenv().expect("config");
//! if config.gemini.is_configured() {
//!     println!("model: {}", config.gemini.model);
//! }
//! ```

mod error;
mod gemini;
mod personas;
mod scan;

pub use error::ConfigError;
pub use gemini::GeminiConfig;
pub use personas::PersonasConfig;
pub use scan::ScanConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "LENS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LensConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub personas: PersonasConfig,
}

impl LensConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`load_with_dotenv`](Self::load_with_dotenv)
    /// if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env_overrides(&[])
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration with extra `LENS_*`-style key/value pairs layered
    /// below the process environment.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_env_overrides(overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_with_overrides(overrides).extract()?;
        config.scan.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_with_overrides(&[])
    }

    fn figment_with_overrides(overrides: &[(String, String)]) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".lens/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: External overrides
        for (key, value) in overrides {
            if let Some(path) = override_key_path(key) {
                // Parse like `Env` does so numeric and boolean values keep their type.
                let value = value
                    .parse::<Value>()
                    .unwrap_or_else(|_| Value::from(value.clone()));
                figment = figment.merge(Serialized::default(&path, value));
            }
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lens").join("config.toml"))
    }
}

/// Map `LENS_GEMINI__API_KEY` to `gemini.api_key`. Keys without the prefix
/// are ignored.
fn override_key_path(key: &str) -> Option<String> {
    let rest = key.strip_prefix(ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_ascii_lowercase().replace("__", "."))
}
