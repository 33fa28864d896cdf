//! Image upload adapters.

use async_trait::async_trait;
use scribe_editor::ImageFile;
use scribe_parser::ImageSource;
use tracing::debug;

use crate::error::SyncResult;

/// Turns a picked file into something an image block can point at
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: ImageFile) -> SyncResult<ImageSource>;
}

/// Embeds the file as a base64 payload instead of uploading it
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedUploader;

#[async_trait]
impl ImageUploader for EmbedUploader {
    async fn upload(&self, file: ImageFile) -> SyncResult<ImageSource> {
        let source = file.to_source()?;
        debug!(file = %file.file_name, bytes = file.bytes.len(), "Embedded image");
        Ok(source)
    }
}
