use crate::domain::keys::ApiKeyRecord;
use crate::error::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Credential store holding provider API keys.
///
/// The synthesis pipeline only reads active keys and flips their health
/// counters; keys are provisioned elsewhere. Every write is an independent
/// last-write-wins update.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Active keys for `provider`, fewest errors first
    async fn find_active(&self, provider: &str) -> AppResult<Vec<ApiKeyRecord>>;

    /// Clear the error counter after a successful call
    async fn reset_error_count(&self, id: Uuid) -> AppResult<()>;

    /// Record one non-fatal failure
    async fn increment_error_count(&self, id: Uuid) -> AppResult<()>;

    /// Take a key out of rotation (authentication failure)
    async fn deactivate(&self, id: Uuid) -> AppResult<()>;
}
