use super::storage_repository::{StorageError, StorageRepository};
use async_trait::async_trait;

/// Supabase Storage implementation of the storage repository
pub struct SupabaseStorageRepository {
    http_client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorageRepository {
    pub fn new(http_client: reqwest::Client, base_url: String, service_key: String, bucket: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }

    /// Percent-encode each path segment, keeping the separators
    fn encode_path(path: &str) -> String {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            Self::encode_path(path)
        )
    }
}

#[async_trait]
impl StorageRepository for SupabaseStorageRepository {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        let size = bytes.len();

        let response = self
            .http_client
            .post(self.object_url(path))
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StorageError::Upload { status, message });
        }

        tracing::debug!(
            bucket = %self.bucket,
            path = path,
            size_bytes = size,
            "Clip uploaded to storage"
        );

        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            Self::encode_path(path)
        )
    }
}
