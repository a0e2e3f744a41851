//! `generateContent` response envelope and verdict extraction.

use lens_core::{AnalysisError, AnalysisResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Extract and validate the verdict from a successful response body.
///
/// # Errors
///
/// Returns [`AnalysisError::Parse`] when the envelope is malformed, the
/// prompt was blocked, no candidate carries text, or the text does not
/// satisfy the verdict contract.
pub fn parse_verdict(body: &str) -> Result<AnalysisResult, AnalysisError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|error| AnalysisError::Parse(format!("malformed response envelope: {error}")))?;

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(AnalysisError::Parse(format!("prompt blocked: {reason}")));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(AnalysisError::Parse("response has no candidates".to_string()));
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(AnalysisError::Parse(format!(
            "candidate has no text (finish reason {reason})"
        )));
    }

    AnalysisResult::from_json(&text)
}
