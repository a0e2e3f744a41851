//! Units of captured input handed to the inference collaborator.

use std::path::Path;

/// One captured unit: a still frame or a block of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputUnit {
    Image(ImageUnit),
    Text { content: String },
}

impl InputUnit {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Short description for logs, never the payload itself.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Image(image) => format!("image ({}, {} bytes)", image.mime_type, image.bytes.len()),
            Self::Text { content } => format!("text ({} chars)", content.chars().count()),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ImageUnit {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for ImageUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUnit")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl ImageUnit {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read an image file, inferring its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`std::io::ErrorKind::InvalidInput`] for unsupported extensions.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let mime_type = mime_for_path(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unsupported image type: {}", path.display()),
            )
        })?;
        let bytes = std::fs::read(path)?;
        Ok(Self::new(bytes, mime_type))
    }
}

/// MIME type for a supported image path, by extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("frame.jpg", Some("image/jpeg"))]
    #[case("frame.JPEG", Some("image/jpeg"))]
    #[case("label.png", Some("image/png"))]
    #[case("shot.webp", Some("image/webp"))]
    #[case("photo.heic", Some("image/heic"))]
    #[case("notes.txt", None)]
    #[case("no_extension", None)]
    fn mime_detection(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(mime_for_path(Path::new(name)), expected);
    }

    #[test]
    fn describe_does_not_leak_payload() {
        let unit = InputUnit::text("sugar, salt");
        assert_eq!(unit.describe(), "text (11 chars)");
        let image = InputUnit::Image(ImageUnit::new(vec![0; 16], "image/png"));
        assert_eq!(image.describe(), "image (image/png, 16 bytes)");
    }
}
