use async_trait::async_trait;

use crate::credential::Credential;
use crate::errors::AnalysisError;
use crate::input::InputUnit;
use crate::result::AnalysisResult;

/// One round trip to the inference collaborator.
///
/// Implementations perform exactly one request per call, never retry, and
/// classify every failure into an [`AnalysisError`]. A blank credential must
/// fail with [`AnalysisError::MissingCredential`] before any network I/O.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        unit: &InputUnit,
        instruction: Option<&str>,
        credential: &Credential,
    ) -> Result<AnalysisResult, AnalysisError>;
}
