use crate::auth::password::hash_password;
use crate::auth::token::{new_session_token, new_user_id};
use crate::auth::verifier::ensure_address_available;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Admin, User, UserProfile};
use crate::store::IdentityStore;

/// Creates a user together with its profile.
///
/// The address pre-check only rejects obvious duplicates before paying for
/// the bcrypt hash. The store's insert re-checks inside its transaction, so
/// concurrent signups for one address cannot both succeed.
pub async fn register_user(
    store: &dyn IdentityStore,
    config: &Config,
    name: &str,
    address: &str,
    password: &str,
) -> AppResult<User> {
    ensure_address_available(store, address).await?;

    let password_hash = hash_password(password, config.bcrypt_cost)?;
    let now = config.now();
    let user = User::new(
        new_user_id(config.user_id_suffix_len),
        name.to_string(),
        address.to_string(),
        password_hash,
        now,
    );
    let profile = UserProfile::for_user(&user.id, now);

    store.create_user_with_profile(&user, &profile).await?;

    tracing::info!("Created user: {}", user.id);
    Ok(user)
}

/// Replaces the user's session with a fresh token and returns it.
pub async fn issue_user_token(
    store: &dyn IdentityStore,
    config: &Config,
    user: &User,
) -> AppResult<String> {
    let token = new_session_token(&user.id, config.session_token_len);

    let updated = store.update_user_token(&user.id, &token, config.now()).await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!("Issued session for user: {}", user.id);
    Ok(token)
}

pub async fn issue_admin_token(
    store: &dyn IdentityStore,
    config: &Config,
    admin: &Admin,
) -> AppResult<String> {
    let token = new_session_token(&admin.id, config.session_token_len);

    let updated = store.update_admin_token(&admin.id, &token, config.now()).await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!("Issued session for admin: {}", admin.id);
    Ok(token)
}

/// Seeds the bootstrap admin. An existing admin with that id is left alone.
pub async fn ensure_admin(
    store: &dyn IdentityStore,
    config: &Config,
    id: &str,
    password: &str,
) -> AppResult<bool> {
    if store.find_admin(id).await?.is_some() {
        return Ok(false);
    }

    let password_hash = hash_password(password, config.bcrypt_cost)?;
    let created = store
        .create_admin(&Admin::new(id.to_string(), password_hash, config.now()))
        .await?;

    if created {
        tracing::info!("Created bootstrap admin: {}", id);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::auth::token::USER_ID_PREFIX;
    use crate::auth::verifier::{verify_admin, verify_session, verify_user};
    use crate::models::DEFAULT_COMMENT;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn signup_creates_user_and_profile() {
        let store = MemoryStore::new();
        let config = Config::for_tests();

        let user = register_user(&store, &config, "Alice", "a@x.com", "p")
            .await
            .unwrap();

        assert!(user.id.starts_with(USER_ID_PREFIX));
        assert_eq!(user.id.len(), USER_ID_PREFIX.len() + config.user_id_suffix_len);
        assert_ne!(user.password_hash, "p");
        let profile = store.find_profile(&user.id).await.unwrap().unwrap();
        assert_eq!(profile.comment, DEFAULT_COMMENT);
        assert!(profile.friend_id.is_none());
    }

    #[tokio::test]
    async fn second_signup_with_same_address_is_duplicate() {
        let store = MemoryStore::new();
        let config = Config::for_tests();

        register_user(&store, &config, "Alice", "a@x.com", "p")
            .await
            .unwrap();
        let err = register_user(&store, &config, "Alicia", "a@x.com", "q")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateIdentity));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_signups_for_one_address_admit_one() {
        let store: Arc<dyn IdentityStore> = Arc::new(MemoryStore::new());
        let config = Arc::new(Config::for_tests());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let config = config.clone();
                tokio::spawn(async move {
                    register_user(store.as_ref(), &config, &format!("n{i}"), "same@x.com", "p")
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::DuplicateIdentity) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_token_replaces_the_previous_one() {
        let store = MemoryStore::new();
        let config = Config::for_tests();
        register_user(&store, &config, "Alice", "a@x.com", "p")
            .await
            .unwrap();

        let user = verify_user(&store, &config, "Alice", "a@x.com", "p").await.unwrap();
        let first = issue_user_token(&store, &config, &user).await.unwrap();
        let second = issue_user_token(&store, &config, &user).await.unwrap();

        assert!(first.starts_with(&user.id));
        assert_eq!(first.len(), user.id.len() + config.session_token_len);
        assert_ne!(first, second);
        assert!(verify_session(&store, &user.id, &second).await.is_ok());
        assert!(verify_session(&store, &user.id, &first).await.is_err());
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once() {
        let store = MemoryStore::new();
        let config = Config::for_tests();

        assert!(ensure_admin(&store, &config, "root", "p").await.unwrap());
        assert!(!ensure_admin(&store, &config, "root", "other").await.unwrap());

        let admin = verify_admin(&store, &config, "root", "p").await.unwrap();
        let token = issue_admin_token(&store, &config, &admin).await.unwrap();
        assert!(token.starts_with("root"));
        let stored = store.find_admin("root").await.unwrap().unwrap();
        assert_eq!(stored.token.as_deref(), Some(token.as_str()));
    }

    fn signup_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn login_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 18, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn issuing_a_token_moves_updated_at() {
        let store = MemoryStore::new();
        let mut config = Config::for_tests();
        config.clock = signup_time;
        let user = register_user(&store, &config, "Alice", "a@x.com", "p")
            .await
            .unwrap();
        assert_eq!(user.created_at, signup_time());

        config.clock = login_time;
        issue_user_token(&store, &config, &user).await.unwrap();

        let stored = store
            .find_users_by_login("Alice", "a@x.com")
            .await
            .unwrap()
            .remove(0);
        assert_eq!(stored.created_at, signup_time());
        assert_eq!(stored.updated_at, login_time());
    }

    #[tokio::test]
    async fn issuing_for_a_missing_identity_is_not_found() {
        let store = MemoryStore::new();
        let config = Config::for_tests();
        let now = config.now();

        let ghost = User::new(
            "user_ghost".into(),
            "Ghost".into(),
            "g@x.com".into(),
            "hash".into(),
            now,
        );
        assert!(matches!(
            issue_user_token(&store, &config, &ghost).await,
            Err(AppError::NotFound)
        ));

        let admin = Admin::new("ghost".into(), "hash".into(), now);
        assert!(matches!(
            issue_admin_token(&store, &config, &admin).await,
            Err(AppError::NotFound)
        ));
    }
}
