use crate::auth::password::{verify_against_dummy, verify_password};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Admin, User};
use crate::store::IdentityStore;

/// Fails with `DuplicateIdentity` when a user already holds `address`.
pub async fn ensure_address_available(store: &dyn IdentityStore, address: &str) -> AppResult<()> {
    let count = store.count_users_by_address(address).await?;
    if count > 0 {
        tracing::warn!("address is already registered");
        return Err(AppError::DuplicateIdentity);
    }
    Ok(())
}

/// Resolves `(name, address, password)` to exactly one user.
///
/// No match and more than one match are both authentication failures.
pub async fn verify_user(
    store: &dyn IdentityStore,
    config: &Config,
    name: &str,
    address: &str,
    password: &str,
) -> AppResult<User> {
    let candidates = store.find_users_by_login(name, address).await?;
    if candidates.is_empty() {
        verify_against_dummy(password, config.bcrypt_cost);
    }

    let mut matched = Vec::with_capacity(1);
    for user in candidates {
        if verify_password(password, &user.password_hash)? {
            matched.push(user);
        }
    }

    if matched.len() != 1 {
        tracing::warn!("user login rejected: {} matching users", matched.len());
        return Err(AppError::AuthenticationFailed);
    }

    Ok(matched.remove(0))
}

pub async fn verify_admin(
    store: &dyn IdentityStore,
    config: &Config,
    id: &str,
    password: &str,
) -> AppResult<Admin> {
    let Some(admin) = store.find_admin(id).await? else {
        verify_against_dummy(password, config.bcrypt_cost);
        tracing::warn!("admin login rejected: unknown id {}", id);
        return Err(AppError::AuthenticationFailed);
    };

    if !verify_password(password, &admin.password_hash)? {
        tracing::warn!("admin login rejected: wrong password for {}", id);
        return Err(AppError::AuthenticationFailed);
    }

    Ok(admin)
}

/// Checks that `token` is the session currently stored on user `user_id`.
pub async fn verify_session(store: &dyn IdentityStore, user_id: &str, token: &str) -> AppResult<()> {
    if token.is_empty() {
        return Err(AppError::AuthenticationFailed);
    }

    let count = store.count_users_by_session(user_id, token).await?;
    if count != 1 {
        tracing::warn!("session rejected for {}: {} matches", user_id, count);
        return Err(AppError::AuthenticationFailed);
    }
    Ok(())
}
