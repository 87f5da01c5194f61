use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{IdentityStore, StoreError};
use crate::models::{Admin, User, UserProfile};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    profiles: HashMap<String, UserProfile>,
    admins: HashMap<String, Admin>,
}

/// In-process store for tests and for running without Postgres.
///
/// Every operation takes the table lock once, so the signup check and both
/// inserts happen as a single step.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user with no companion profile, a state only a broken
    /// database could produce.
    #[cfg(test)]
    pub(crate) async fn insert_user_without_profile(&self, user: User) {
        let mut tables = self.tables.write().await;
        tables.users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(users)
    }

    async fn count_users_by_address(&self, address: &str) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables
            .users
            .values()
            .filter(|u| u.address == address)
            .count();
        Ok(count as i64)
    }

    async fn find_users_by_login(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.name == name && u.address == address)
            .cloned()
            .collect())
    }

    async fn create_user_with_profile(
        &self,
        user: &User,
        profile: &UserProfile,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.address == user.address) {
            return Err(StoreError::DuplicateAddress);
        }
        if tables.users.contains_key(&user.id) || tables.profiles.contains_key(&profile.id) {
            return Err(StoreError::Conflict(format!("user id {} is taken", user.id)));
        }

        tables.users.insert(user.id.clone(), user.clone());
        tables.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn update_user_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(id) {
            Some(user) => {
                user.token = Some(token.to_string());
                user.updated_at = now;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count_users_by_session(&self, id: &str, token: &str) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables
            .users
            .values()
            .filter(|u| u.id == id && u.token.as_deref() == Some(token))
            .count();
        Ok(count as i64)
    }

    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(id).cloned())
    }

    async fn update_profile_comment(
        &self,
        id: &str,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.profiles.get_mut(id) {
            Some(profile) => {
                profile.comment = comment.to_string();
                profile.updated_at = now;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_admin(&self, id: &str) -> Result<Option<Admin>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.admins.get(id).cloned())
    }

    async fn create_admin(&self, admin: &Admin) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.admins.contains_key(&admin.id) {
            return Ok(false);
        }
        tables.admins.insert(admin.id.clone(), admin.clone());
        Ok(true)
    }

    async fn update_admin_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.admins.get_mut(id) {
            Some(admin) => {
                admin.token = Some(token.to_string());
                admin.updated_at = now;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, address: &str) -> User {
        User::new(
            id.into(),
            "Alice".into(),
            address.into(),
            "hash".into(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn duplicate_address_writes_nothing() {
        let store = MemoryStore::new();
        let first = user("user_1", "a@x.com");
        store
            .create_user_with_profile(&first, &UserProfile::for_user(&first.id, Utc::now()))
            .await
            .unwrap();

        let second = user("user_2", "a@x.com");
        let err = store
            .create_user_with_profile(&second, &UserProfile::for_user(&second.id, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateAddress));
        assert!(store.find_profile("user_2").await.unwrap().is_none());
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn session_count_requires_matching_id_and_token() {
        let store = MemoryStore::new();
        let u = user("user_1", "a@x.com");
        store
            .create_user_with_profile(&u, &UserProfile::for_user(&u.id, Utc::now()))
            .await
            .unwrap();

        assert_eq!(store.count_users_by_session("user_1", "tok").await.unwrap(), 0);
        assert_eq!(store.update_user_token("user_1", "tok", Utc::now()).await.unwrap(), 1);
        assert_eq!(store.count_users_by_session("user_1", "tok").await.unwrap(), 1);
        assert_eq!(store.count_users_by_session("user_2", "tok").await.unwrap(), 0);
        assert_eq!(store.update_user_token("user_2", "tok", Utc::now()).await.unwrap(), 0);
    }
}
