use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A provider credential as stored in the `api_keys` table.
#[derive(Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub provider: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "key_value")]
    pub secret_value: String,
    pub is_active: bool,
    pub error_count: i32,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiKeyRecord {
    pub fn new(provider: &str, secret_value: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: provider.to_string(),
            secret_value: secret_value.to_string(),
            is_active: true,
            error_count: 0,
            last_used_at: None,
        }
    }
}

// Keeps secrets out of logs.
impl std::fmt::Debug for ApiKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyRecord")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("secret_value", &"<redacted>")
            .field("is_active", &self.is_active)
            .field("error_count", &self.error_count)
            .field("last_used_at", &self.last_used_at)
            .finish()
    }
}
