use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: String,
    pub token: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(id: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            token: None,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
