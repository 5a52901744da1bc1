use anyhow::Result;
use exam_audio::domain::keys::ApiKeyRecord;
use exam_audio::infrastructure::repositories::ApiKeyRepository;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestFixtures {
    pool: PgPool,
    keys: ApiKeyRepository,
}

impl TestFixtures {
    pub fn new(pool: PgPool) -> Self {
        let keys = ApiKeyRepository::new(Arc::new(pool.clone()));
        Self { pool, keys }
    }

    pub async fn create_key(&self, provider: &str, secret: &str, error_count: i32) -> Result<ApiKeyRecord> {
        let mut record = ApiKeyRecord::new(provider, secret);
        record.error_count = error_count;
        self.keys.insert(&record).await?;
        Ok(record)
    }

    pub async fn create_inactive_key(&self, provider: &str, secret: &str) -> Result<ApiKeyRecord> {
        let mut record = ApiKeyRecord::new(provider, secret);
        record.is_active = false;
        self.keys.insert(&record).await?;
        Ok(record)
    }

    /// `(is_active, error_count)` as stored
    pub async fn key_state(&self, id: Uuid) -> Result<(bool, i32)> {
        let row: (bool, i32) = sqlx::query_as("SELECT is_active, error_count FROM api_keys WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}
