use super::ApiKeyRecord;
use crate::domain::tts::error::SynthesisError;
use crate::infrastructure::repositories::ApiKeyStore;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Snapshot of the usable keys for one batch, with a rotating cursor.
///
/// Keys are ordered by ascending error count so the healthiest ones are
/// handed out first. A key retired during the batch (authentication failure)
/// is never handed out again by this pool.
#[derive(Debug, Default)]
pub struct KeyPool {
    keys: Vec<ApiKeyRecord>,
    cursor: usize,
    retired: usize,
}

/// A pool shared by the workers of a single batch.
pub type SharedKeyPool = Arc<Mutex<KeyPool>>;

impl KeyPool {
    pub fn new(mut keys: Vec<ApiKeyRecord>) -> Self {
        keys.retain(|k| k.is_active);
        keys.sort_by_key(|k| k.error_count);
        Self {
            keys,
            cursor: 0,
            retired: 0,
        }
    }

    pub fn shared(self) -> SharedKeyPool {
        Arc::new(Mutex::new(self))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether any key was removed from rotation during this batch
    pub fn has_retired(&self) -> bool {
        self.retired > 0
    }

    /// Record at the cursor; the cursor advances modulo the pool size.
    pub fn next(&mut self) -> Option<ApiKeyRecord> {
        if self.keys.is_empty() {
            return None;
        }
        let index = self.cursor % self.keys.len();
        self.cursor = (index + 1) % self.keys.len();
        Some(self.keys[index].clone())
    }

    /// Next key in rotation that is not in `exclude`.
    ///
    /// Scans at most one full turn of the pool, so it returns `None` once
    /// every remaining key has been excluded.
    pub fn next_excluding(&mut self, exclude: &HashSet<Uuid>) -> Option<ApiKeyRecord> {
        for _ in 0..self.keys.len() {
            let candidate = self.next()?;
            if !exclude.contains(&candidate.id) {
                return Some(candidate);
            }
        }
        None
    }

    /// Remove a key from rotation for the rest of the batch
    pub fn retire(&mut self, id: Uuid) {
        if let Some(position) = self.keys.iter().position(|k| k.id == id) {
            self.keys.remove(position);
            self.retired += 1;
            if position < self.cursor {
                self.cursor -= 1;
            }
            if self.keys.is_empty() {
                self.cursor = 0;
            } else {
                self.cursor %= self.keys.len();
            }
        }
    }
}

/// Loads key pools from the credential store and reports call outcomes back.
pub struct KeyPoolManager {
    store: Arc<dyn ApiKeyStore>,
    provider: String,
}

impl KeyPoolManager {
    pub fn new(store: Arc<dyn ApiKeyStore>, provider: String) -> Self {
        Self { store, provider }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Fetch the active keys for the provider into a fresh per-batch pool
    pub async fn load(&self) -> Result<KeyPool, SynthesisError> {
        let records = self
            .store
            .find_active(&self.provider)
            .await
            .map_err(|e| SynthesisError::Dependency(e.to_string()))?;

        tracing::debug!(
            provider = %self.provider,
            active_keys = records.len(),
            "Key pool loaded"
        );

        Ok(KeyPool::new(records))
    }

    pub async fn report_success(&self, record: &ApiKeyRecord) {
        if let Err(e) = self.store.reset_error_count(record.id).await {
            tracing::warn!(
                key_id = %record.id,
                error = %e,
                "Failed to reset key error count"
            );
        }
    }

    /// `fatal` deactivates the key; otherwise its error count is bumped.
    /// Store failures are logged and swallowed.
    pub async fn report_failure(&self, record: &ApiKeyRecord, fatal: bool) {
        let result = if fatal {
            tracing::warn!(key_id = %record.id, provider = %self.provider, "Deactivating API key");
            self.store.deactivate(record.id).await
        } else {
            self.store.increment_error_count(record.id).await
        };

        if let Err(e) = result {
            tracing::warn!(
                key_id = %record.id,
                fatal = fatal,
                error = %e,
                "Failed to record key failure"
            );
        }
    }
}
