//! Capture sources: where each scan tick gets its input unit.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use lens_core::input::mime_for_path;
use lens_core::{ImageUnit, InputUnit};

use crate::error::CaptureError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    Ready(InputUnit),
    /// Nothing to analyze yet. The tick is skipped with no side effects.
    NotReady,
}

/// Produces one input unit per attempt. Must not block for long.
pub trait CaptureSource: Send {
    /// # Errors
    ///
    /// Returns [`CaptureError`] when the source is broken rather than empty.
    fn capture(&mut self) -> Result<Capture, CaptureError>;
}

/// Always yields the same unit.
#[derive(Debug, Clone)]
pub struct StaticSource {
    unit: InputUnit,
}

impl StaticSource {
    #[must_use]
    pub const fn new(unit: InputUnit) -> Self {
        Self { unit }
    }
}

impl CaptureSource for StaticSource {
    fn capture(&mut self) -> Result<Capture, CaptureError> {
        Ok(Capture::Ready(self.unit.clone()))
    }
}

/// Current content of a text file. Missing or blank means not ready.
#[derive(Debug, Clone)]
pub struct TextFileSource {
    path: PathBuf,
}

impl TextFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureSource for TextFileSource {
    fn capture(&mut self) -> Result<Capture, CaptureError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Capture::NotReady),
            Ok(content) => Ok(Capture::Ready(InputUnit::text(content))),
            Err(error) if error.kind() == IoErrorKind::NotFound => Ok(Capture::NotReady),
            Err(error) => Err(CaptureError::io(&self.path, error)),
        }
    }
}

/// Newest supported image in a directory, the way a camera exposes its latest
/// frame. Non-image files are ignored.
#[derive(Debug, Clone)]
pub struct LatestFrameSource {
    dir: PathBuf,
}

impl LatestFrameSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn newest_frame(&self) -> Result<Option<PathBuf>, CaptureError> {
        if !self.dir.is_dir() {
            if self.dir.exists() {
                return Err(CaptureError::NotADirectory(self.dir.clone()));
            }
            return Ok(None);
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| CaptureError::io(&self.dir, e))?;
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry.map_err(|e| CaptureError::io(&self.dir, e))?;
            let path = entry.path();
            if mime_for_path(&path).is_none() {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            // Ties break on file name so repeated scans agree.
            let newer = newest.as_ref().is_none_or(|(time, best)| {
                modified > *time || (modified == *time && path.as_path() > best.as_path())
            });
            if newer {
                newest = Some((modified, path));
            }
        }
        Ok(newest.map(|(_, path)| path))
    }
}

impl CaptureSource for LatestFrameSource {
    fn capture(&mut self) -> Result<Capture, CaptureError> {
        let Some(path) = self.newest_frame()? else {
            return Ok(Capture::NotReady);
        };
        read_frame(&path)
    }
}

fn read_frame(path: &Path) -> Result<Capture, CaptureError> {
    match ImageUnit::from_path(path) {
        Ok(image) if image.bytes.is_empty() => Ok(Capture::NotReady),
        Ok(image) => Ok(Capture::Ready(InputUnit::Image(image))),
        // Frame rotated away between listing and reading.
        Err(error) if error.kind() == IoErrorKind::NotFound => Ok(Capture::NotReady),
        Err(error) => Err(CaptureError::io(path, error)),
    }
}
