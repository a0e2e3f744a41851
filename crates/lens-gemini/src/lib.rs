//! # lens-gemini
//!
//! Gemini `generateContent` client for Label Lens.
//!
//! [`GeminiClient`] implements [`lens_core::Analyzer`]: one captured unit and
//! an optional persona instruction go out as a single structured-output
//! request, and the reply comes back as a validated
//! [`lens_core::AnalysisResult`] or one classified [`lens_core::AnalysisError`].
//! The client never retries; pacing belongs to the scan scheduler.

mod http;
mod request;
mod response;

pub use request::response_schema;

use std::time::Duration;

use async_trait::async_trait;
use lens_config::GeminiConfig;
use lens_core::{AnalysisError, AnalysisResult, Analyzer, Credential, InputUnit};

use crate::http::{classify_transport, read_success_body};
use crate::request::GenerateRequest;
use crate::response::parse_verdict;

/// HTTP client for the Generative Language API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Create a client from the `[gemini]` config section.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(concat!("label-lens/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("reqwest client should build"),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Model this client talks to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(
        &self,
        unit: &InputUnit,
        instruction: Option<&str>,
        credential: &Credential,
    ) -> Result<AnalysisResult, AnalysisError> {
        if credential.is_blank() {
            return Err(AnalysisError::MissingCredential);
        }

        let body = GenerateRequest::build(unit, instruction);
        tracing::debug!(
            model = %self.model,
            unit = %unit.describe(),
            persona = instruction.is_some(),
            "gemini: generateContent"
        );

        let resp = self
            .http
            .post(self.url())
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|error| classify_transport(&error))?;

        let text = read_success_body(resp).await?;
        let verdict = parse_verdict(&text)?;
        tracing::debug!(
            health_score = verdict.health_score,
            villains = verdict.villains.len(),
            "gemini: verdict parsed"
        );
        Ok(verdict)
    }
}
