use base64::{engine::general_purpose, Engine as _};
use std::path::Path;
use tracing::debug;

use crate::utils::MedicoreError;

/// Raw base64 image bytes as sent to the model, without the data URI prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Re-attach the data URI scheme prefix
    pub fn to_data_uri(&self) -> String {
        format!("{}{}", scheme_prefix(&self.mime_type), self.data)
    }
}

/// An image waiting to be sent with the next submission.
///
/// Held as a complete data URI, the same form used for the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    mime_type: String,
    data_uri: String,
    size: usize,
}

impl Attachment {
    /// Read an image file fully into memory and encode it
    pub async fn from_path(path: &Path, max_bytes: u64) -> Result<Self, MedicoreError> {
        let mime_type = mime_for_path(path).ok_or_else(|| {
            MedicoreError::Image(format!(
                "unsupported image type: {} (expected png, jpg, jpeg, gif, webp or bmp)",
                path.display()
            ))
        })?;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| MedicoreError::Image(format!("cannot read {}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(MedicoreError::Image(format!(
                "{} is not a file",
                path.display()
            )));
        }
        if metadata.len() > max_bytes {
            return Err(MedicoreError::Image(format!(
                "{} is {} bytes, limit is {}",
                path.display(),
                metadata.len(),
                max_bytes
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| MedicoreError::Image(format!("cannot read {}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Attached {} ({} bytes, {})", file_name, bytes.len(), mime_type);
        Ok(Self::from_bytes(file_name, mime_type, &bytes))
    }

    /// Encode in-memory image bytes
    pub fn from_bytes(file_name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        let encoded = general_purpose::STANDARD.encode(bytes);
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.to_string(),
            data_uri: format!("{}{}", scheme_prefix(mime_type), encoded),
            size: bytes.len(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Decoded size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Full data URI, as used for the preview
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Everything before the encoded bytes: `data:<mime>;base64,`
    pub fn scheme_prefix(&self) -> &str {
        match self.data_uri.find(',') {
            Some(comma) => &self.data_uri[..=comma],
            None => "",
        }
    }

    /// The encoded bytes alone, with the scheme prefix stripped
    pub fn raw_payload(&self) -> &str {
        self.data_uri
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or(&self.data_uri)
    }

    /// What actually goes over the wire
    pub fn to_image_payload(&self) -> ImagePayload {
        ImagePayload {
            mime_type: self.mime_type.clone(),
            data: self.raw_payload().to_string(),
        }
    }
}

fn scheme_prefix(mime_type: &str) -> String {
    format!("data:{};base64,", mime_type)
}

/// Infer an image MIME type from the file extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
