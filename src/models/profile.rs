use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Comment a profile starts with at signup.
pub const DEFAULT_COMMENT: &str = "Hello!";

/// 1:1 companion of a user, sharing its id.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub id: String,
    pub comment: String,
    pub friend_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn for_user(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: user_id.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            friend_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
