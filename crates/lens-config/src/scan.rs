//! Scan cadence, call spacing, and quota cooldown.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_tick_ms() -> u64 {
    1_000
}

const fn default_min_spacing_ms() -> u64 {
    3_000
}

const fn default_cooldown_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Period of the scheduler tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Minimum time between successful analyses.
    #[serde(default = "default_min_spacing_ms")]
    pub min_spacing_ms: u64,

    /// Pause after a quota-exceeded response.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            min_spacing_ms: default_min_spacing_ms(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl ScanConfig {
    /// Reject zero durations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first zero field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("scan.tick_ms", self.tick_ms),
            ("scan.min_spacing_ms", self.min_spacing_ms),
            ("scan.cooldown_ms", self.cooldown_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    #[must_use]
    pub const fn min_spacing(&self) -> Duration {
        Duration::from_millis(self.min_spacing_ms)
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
