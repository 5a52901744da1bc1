use super::api_key_store::ApiKeyStore;
use crate::domain::keys::ApiKeyRecord;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Postgres-backed credential store (`api_keys` table)
pub struct ApiKeyRepository {
    pool: Arc<DbPool>,
}

impl ApiKeyRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Provision a key with its initial state
    pub async fn insert(&self, record: &ApiKeyRecord) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO api_keys (id, provider, key_value, is_active, error_count, last_used_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.provider)
        .bind(&record.secret_value)
        .bind(record.is_active)
        .bind(record.error_count)
        .bind(record.last_used_at)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Find a key by id regardless of its state
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ApiKeyRecord>> {
        let pool = self.pool.as_ref();
        let record = sqlx::query_as::<_, ApiKeyRecord>(
            r#"
            SELECT id, provider, key_value, is_active, error_count, last_used_at
            FROM api_keys
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }
}

#[async_trait]
impl ApiKeyStore for ApiKeyRepository {
    async fn find_active(&self, provider: &str) -> AppResult<Vec<ApiKeyRecord>> {
        let pool = self.pool.as_ref();
        let records = sqlx::query_as::<_, ApiKeyRecord>(
            r#"
            SELECT id, provider, key_value, is_active, error_count, last_used_at
            FROM api_keys
            WHERE provider = $1 AND is_active = TRUE
            ORDER BY error_count ASC, last_used_at ASC NULLS FIRST
            "#,
        )
        .bind(provider)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    async fn reset_error_count(&self, id: Uuid) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE api_keys
            SET error_count = 0, last_used_at = $2, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn increment_error_count(&self, id: Uuid) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE api_keys
            SET error_count = error_count + 1, last_used_at = $2, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE api_keys
            SET is_active = FALSE, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }
}
