use crate::auth::verifier::verify_session;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::IdentityStore;

/// Overwrites the profile comment of `user_id` after checking that `token`
/// is that user's current session.
pub async fn update_profile(
    store: &dyn IdentityStore,
    config: &Config,
    token: &str,
    user_id: &str,
    comment: &str,
) -> AppResult<()> {
    verify_session(store, user_id, token).await?;

    let updated = store
        .update_profile_comment(user_id, comment, config.now())
        .await?;
    if updated == 0 {
        tracing::warn!("no profile for user {}", user_id);
        return Err(AppError::NotFound);
    }

    tracing::info!("Updated profile of {}", user_id);
    Ok(())
}
