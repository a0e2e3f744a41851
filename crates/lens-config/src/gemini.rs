//! Gemini inference collaborator configuration.

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    String::from("gemini-2.5-flash")
}

fn default_endpoint() -> String {
    String::from("https://generativelanguage.googleapis.com/v1beta")
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`. Blank means analysis is refused
    /// before any network call.
    #[serde(default)]
    pub api_key: String,

    /// Model name, e.g. `gemini-2.5-flash`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeminiConfig {
    /// Check if an API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
