use super::api_key_store::ApiKeyStore;
use crate::domain::keys::ApiKeyRecord;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

/// Process-local credential store.
///
/// Used when keys are supplied through the environment instead of the
/// database, and as a test double.
#[derive(Default)]
pub struct InMemoryApiKeyStore {
    records: RwLock<Vec<ApiKeyRecord>>,
    fail_writes: bool,
}

impl InMemoryApiKeyStore {
    pub fn new(records: Vec<ApiKeyRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            fail_writes: false,
        }
    }

    /// Build a store from plain secrets for one provider
    pub fn from_secrets(provider: &str, secrets: &[String]) -> Self {
        Self::new(
            secrets
                .iter()
                .map(|secret| ApiKeyRecord::new(provider, secret))
                .collect(),
        )
    }

    /// A store whose writes always fail, for exercising non-blocking reporting
    pub fn with_failing_writes(records: Vec<ApiKeyRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            fail_writes: true,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<ApiKeyRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn all(&self) -> Vec<ApiKeyRecord> {
        self.records.read().clone()
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut ApiKeyRecord)) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::Internal("credential store is read-only".to_string()));
        }
        let mut records = self.records.write();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                apply(record);
                Ok(())
            }
            None => Err(AppError::Internal(format!("unknown api key {}", id))),
        }
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn find_active(&self, provider: &str) -> AppResult<Vec<ApiKeyRecord>> {
        let mut active: Vec<ApiKeyRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| r.provider == provider && r.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|r| r.error_count);
        Ok(active)
    }

    async fn reset_error_count(&self, id: Uuid) -> AppResult<()> {
        self.update(id, |record| {
            record.error_count = 0;
            record.last_used_at = Some(Utc::now());
        })
    }

    async fn increment_error_count(&self, id: Uuid) -> AppResult<()> {
        self.update(id, |record| {
            record.error_count += 1;
            record.last_used_at = Some(Utc::now());
        })
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        self.update(id, |record| record.is_active = false)
    }
}
