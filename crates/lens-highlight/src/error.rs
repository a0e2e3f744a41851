//! Highlighter error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighlightError {
    /// The combined term alternation could not be compiled (size limits).
    #[error("failed to build term index: {0}")]
    Pattern(#[from] regex::Error),
}
