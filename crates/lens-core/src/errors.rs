//! Error taxonomy for Label Lens.
//!
//! [`AnalysisError`] is raised once, at the invoker boundary, and travels
//! upward as a tagged value. Callers decide behavior from [`ErrorKind`] only;
//! message text is for humans.

use std::fmt;

use thiserror::Error;

/// Classification tag of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    QuotaExceeded,
    PermissionDenied,
    ParseFailure,
    NetworkFailure,
}

impl ErrorKind {
    /// Kinds that will keep failing until the user re-enters credentials.
    #[must_use]
    pub const fn is_fatal_for_session(self) -> bool {
        matches!(self, Self::MissingCredential | Self::PermissionDenied)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::QuotaExceeded => "quota_exceeded",
            Self::PermissionDenied => "permission_denied",
            Self::ParseFailure => "parse_failure",
            Self::NetworkFailure => "network_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of a single analysis invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// No usable credential; no network call was made.
    #[error("no API key configured (set LENS_GEMINI__API_KEY)")]
    MissingCredential,

    /// The collaborator rejected the call for quota or rate reasons.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The credential was rejected.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The response did not satisfy the verdict contract.
    #[error("unusable response: {0}")]
    Parse(String),

    /// Transport-level failure (connect, timeout, broken body).
    #[error("network failure: {0}")]
    Network(String),

    /// Any other non-success service response.
    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },
}

impl AnalysisError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::Parse(_) => ErrorKind::ParseFailure,
            Self::Network(_) | Self::Service { .. } => ErrorKind::NetworkFailure,
        }
    }
}

/// Errors from loading a persona catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read persona catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid TOML or does not match the catalog shape.
    #[error("invalid persona catalog: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(AnalysisError::MissingCredential, ErrorKind::MissingCredential, true)]
    #[case(AnalysisError::QuotaExceeded("429".into()), ErrorKind::QuotaExceeded, false)]
    #[case(AnalysisError::PermissionDenied("403".into()), ErrorKind::PermissionDenied, true)]
    #[case(AnalysisError::Parse("bad".into()), ErrorKind::ParseFailure, false)]
    #[case(AnalysisError::Network("timeout".into()), ErrorKind::NetworkFailure, false)]
    #[case(
        AnalysisError::Service { status: 503, message: "unavailable".into() },
        ErrorKind::NetworkFailure,
        false
    )]
    fn classification(
        #[case] error: AnalysisError,
        #[case] kind: ErrorKind,
        #[case] fatal: bool,
    ) {
        assert_eq!(error.kind(), kind);
        assert_eq!(error.kind().is_fatal_for_session(), fatal);
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(ErrorKind::QuotaExceeded.to_string(), "quota_exceeded");
    }
}
