use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage upload failed (HTTP {status}): {message}")]
    Upload { status: u16, message: String },
    #[error("storage unreachable: {0}")]
    Transport(String),
}

/// Object storage that serves uploaded clips over public URLs.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Upload (overwriting) `bytes` at `path` and return its public URL
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError>;

    /// Public URL for `path`, whether or not it exists yet
    fn public_url(&self, path: &str) -> String;
}
