//! Binary image attachments (cover images and inline images).

use std::path::Path;

use scribe_parser::ImageSource;

use crate::EditorError;

/// An image file picked by the author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_from_extension)
            .unwrap_or(OCTET_STREAM);

        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn ensure_image(&self) -> Result<(), EditorError> {
        if self.is_image() {
            Ok(())
        } else {
            Err(EditorError::NotAnImage {
                file_name: self.file_name.clone(),
                mime_type: self.mime_type.clone(),
            })
        }
    }

    /// Embed the bytes as a base64 payload
    pub fn to_source(&self) -> Result<ImageSource, EditorError> {
        self.ensure_image()?;
        Ok(ImageSource::from_bytes(&self.mime_type, &self.bytes))
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => OCTET_STREAM,
    }
}
