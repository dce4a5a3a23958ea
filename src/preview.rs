use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use std::path::{Path, PathBuf};

use crate::error::UploadError;

const OCTET_STREAM: &str = "application/octet-stream";

/// The file currently held by the image input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    name: String,
    content_type: String,
}

impl SelectedFile {
    /// Select a file on disk. The content type is guessed from the
    /// extension, the way a browser fills in `File.type`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type_for(&path).to_string();
        Self {
            path,
            name,
            content_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub async fn read(&self) -> Result<Vec<u8>, UploadError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .ok()
        .and_then(mime_for)
        .unwrap_or(OCTET_STREAM)
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}

/// Encode raw bytes as a `data:` URL. The MIME type is sniffed from the
/// bytes first and only falls back to `declared` when sniffing fails.
pub fn data_url(bytes: &[u8], declared: &str) -> String {
    let mime = image::guess_format(bytes)
        .ok()
        .and_then(mime_for)
        .unwrap_or(declared);
    format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Read the selected file and turn it into a preview source.
pub async fn load_data_url(file: &SelectedFile) -> Result<String, UploadError> {
    let bytes = file.read().await?;
    Ok(data_url(&bytes, file.content_type()))
}

/// Turns a selected file into a preview source.
#[async_trait]
pub trait PreviewDecoder: Send + Sync {
    async fn decode(&self, file: &SelectedFile) -> Result<String, UploadError>;
}

/// Reads the file from disk and encodes it as a `data:` URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataUrlDecoder;

#[async_trait]
impl PreviewDecoder for DataUrlDecoder {
    async fn decode(&self, file: &SelectedFile) -> Result<String, UploadError> {
        load_data_url(file).await
    }
}
