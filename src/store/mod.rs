use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Admin, User, UserProfile};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("address is already registered")]
    DuplicateAddress,
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence for users, admins and profiles.
///
/// Implementations must be safe to share across request tasks. Writes that
/// return `u64` report the number of rows they touched.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn count_users_by_address(&self, address: &str) -> Result<i64, StoreError>;

    async fn find_users_by_login(&self, name: &str, address: &str)
    -> Result<Vec<User>, StoreError>;

    /// Inserts the user and its profile atomically. Fails with
    /// [`StoreError::DuplicateAddress`] if the address is taken, in which case
    /// neither row is written.
    async fn create_user_with_profile(
        &self,
        user: &User,
        profile: &UserProfile,
    ) -> Result<(), StoreError>;

    async fn update_user_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    async fn count_users_by_session(&self, id: &str, token: &str) -> Result<i64, StoreError>;

    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn update_profile_comment(
        &self,
        id: &str,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    async fn find_admin(&self, id: &str) -> Result<Option<Admin>, StoreError>;

    /// Returns `false` if an admin with the same id already exists.
    async fn create_admin(&self, admin: &Admin) -> Result<bool, StoreError>;

    async fn update_admin_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
