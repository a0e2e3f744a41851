use std::path::PathBuf;

/// Errors from a capture source. Any of these ends the scan.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Reading the source failed for a reason other than "nothing there yet".
    #[error("failed to read capture source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The frames location exists but is not a directory.
    #[error("capture source {0} is not a directory")]
    NotADirectory(PathBuf),
}

impl CaptureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
