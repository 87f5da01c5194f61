use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("identity is already registered")]
    DuplicateIdentity,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("{0}")]
    Validation(String),
    #[error("not found")]
    NotFound,
    #[error("not implemented")]
    NotImplemented,
    #[error("persistence error: {0}")]
    Persistence(#[source] StoreError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateAddress => AppError::DuplicateIdentity,
            other => AppError::Persistence(other),
        }
    }
}

/// Detail of a server-side failure, attached to the response for
/// `middleware::log_errors` to report. It never reaches the client.
#[derive(Clone, Debug)]
pub struct ErrorDetail(pub String);

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateIdentity => StatusCode::CONFLICT,
            AppError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            AppError::Persistence(_) | AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // server-side failures go out as a bare status, details stay in the log
        if status.is_server_error() {
            let mut response = status.into_response();
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                response
                    .extensions_mut()
                    .insert(ErrorDetail(self.to_string()));
            }
            return response;
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
