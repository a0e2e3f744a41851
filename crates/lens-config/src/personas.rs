//! Persona catalog selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PersonasConfig {
    /// TOML catalog file. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Persona selected when a scan starts.
    #[serde(default)]
    pub default_persona: Option<String>,

    /// Sub-option of `default_persona` selected when a scan starts.
    #[serde(default)]
    pub default_sub_option: Option<String>,
}
