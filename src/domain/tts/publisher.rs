use super::model::ClipLocation;
use crate::domain::audio::AudioFormat;
use crate::infrastructure::repositories::StorageRepository;
use std::sync::Arc;

/// `{directory}/{hash}.{ext}` with surrounding slashes stripped from `directory`.
pub fn storage_path(directory: &str, hash: &str, format: AudioFormat) -> String {
    let directory = directory.trim_matches('/');
    if directory.is_empty() {
        format!("{}.{}", hash, format.extension())
    } else {
        format!("{}/{}.{}", directory, hash, format.extension())
    }
}

/// Uploads encoded clips, falling back to returning the bytes inline.
pub struct StoragePublisher {
    storage: Arc<dyn StorageRepository>,
}

impl StoragePublisher {
    pub fn new(storage: Arc<dyn StorageRepository>) -> Self {
        Self { storage }
    }

    /// Never fails: an upload error degrades to `ClipLocation::Inline`.
    pub async fn publish(&self, path: &str, bytes: Vec<u8>, format: AudioFormat) -> ClipLocation {
        // The upload consumes the buffer; keep a copy for the fallback.
        match self.storage.upload(path, bytes.clone(), format.content_type()).await {
            Ok(url) => ClipLocation::Url(url),
            Err(e) => {
                tracing::warn!(
                    path = path,
                    size_bytes = bytes.len(),
                    error = %e,
                    "Upload failed, returning clip inline"
                );
                ClipLocation::Inline(bytes)
            }
        }
    }
}
