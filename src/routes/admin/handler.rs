use axum::{
    extract::{Json, State},
    http::HeaderMap,
};

use crate::{
    AppState,
    auth::{issuer, verifier},
    error::{AppError, AppResult},
    routes::user::{LoginResponse, SuccessResponse},
    utils::required_header,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<LoginResponse>> {
    let id = required_header(&headers, "id")?;
    let password = required_header(&headers, "password")?;

    let admin = verifier::verify_admin(state.store.as_ref(), &state.config, id, password).await?;
    let token = issuer::issue_admin_token(state.store.as_ref(), &state.config, &admin).await?;

    Ok(Json(LoginResponse {
        success: true,
        id: admin.id,
        token,
    }))
}

/// Always answers 501. Banning is not offered yet.
pub async fn ban() -> AppResult<Json<SuccessResponse>> {
    Err(AppError::NotImplemented)
}
