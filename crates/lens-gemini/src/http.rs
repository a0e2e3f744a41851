//! Failure classification for Gemini HTTP exchanges.
//!
//! Every transport or service failure is mapped to exactly one
//! [`AnalysisError`] here, from status codes and the structured `status` /
//! `reason` fields of the Google API error envelope. Message text is carried
//! along for display only.

use lens_core::AnalysisError;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Classify a non-success response from its status code and body.
#[must_use]
pub fn classify_status(status: u16, body: &str) -> AnalysisError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let api = envelope.error;
    let message = if api.message.is_empty() {
        body.chars().take(200).collect::<String>()
    } else {
        api.message
    };
    let has_reason = |wanted: &str| {
        api.details
            .iter()
            .any(|detail| detail.reason.as_deref() == Some(wanted))
    };

    if status == 429 || api.status == "RESOURCE_EXHAUSTED" {
        return AnalysisError::QuotaExceeded(message);
    }
    if matches!(status, 401 | 403)
        || matches!(api.status.as_str(), "PERMISSION_DENIED" | "UNAUTHENTICATED")
        || has_reason("API_KEY_INVALID")
    {
        return AnalysisError::PermissionDenied(message);
    }
    AnalysisError::Service { status, message }
}

/// Classify a reqwest transport error.
#[must_use]
pub fn classify_transport(error: &reqwest::Error) -> AnalysisError {
    if let Some(status) = error.status() {
        return classify_status(status.as_u16(), "");
    }
    if error.is_timeout() {
        return AnalysisError::Network(format!("request timed out: {error}"));
    }
    AnalysisError::Network(error.to_string())
}

/// Check an HTTP response and return its body on success.
///
/// # Errors
///
/// Returns the classified [`AnalysisError`] for non-success statuses or a
/// body that cannot be read.
pub async fn read_success_body(resp: reqwest::Response) -> Result<String, AnalysisError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|error| classify_transport(&error))?;
    if !status.is_success() {
        return Err(classify_status(status.as_u16(), &body));
    }
    Ok(body)
}
