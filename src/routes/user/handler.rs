use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::HeaderMap,
};

use crate::{
    AppState,
    auth::{issuer, profile, verifier},
    error::{AppError, AppResult},
    utils::required_header,
};

use super::model::{
    LoginResponse, SuccessResponse, UpdateProfileRequest, UserSummary, UsersResponse,
};

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UsersResponse>> {
    let users = state.store.list_users().await?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserSummary::from).collect(),
    }))
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SuccessResponse>> {
    let name = required_header(&headers, "name")?;
    let address = required_header(&headers, "address")?;
    let password = required_header(&headers, "password")?;

    issuer::register_user(state.store.as_ref(), &state.config, name, address, password).await?;

    Ok(Json(SuccessResponse { success: true }))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<LoginResponse>> {
    let name = required_header(&headers, "name")?;
    let address = required_header(&headers, "address")?;
    let password = required_header(&headers, "password")?;

    let user = verifier::verify_user(state.store.as_ref(), &state.config, name, address, password)
        .await?;
    let token = issuer::issue_user_token(state.store.as_ref(), &state.config, &user).await?;

    Ok(Json(LoginResponse {
        success: true,
        id: user.id,
        token,
    }))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse>> {
    let Json(req) = payload.map_err(|e| {
        tracing::warn!("request decoding failed: {}", e);
        AppError::Validation("invalid json".into())
    })?;

    // a missing token is a failed login, not a malformed request
    let token = required_header(&headers, "token").map_err(|_| AppError::AuthenticationFailed)?;

    profile::update_profile(
        state.store.as_ref(),
        &state.config,
        token,
        &req.id,
        &req.profile_message,
    )
    .await?;

    Ok(Json(SuccessResponse { success: true }))
}
