use axum::http::HeaderMap;

use crate::error::{AppError, AppResult};

/// Reads a non-empty header as UTF-8 text.
pub fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<&'a str> {
    let value = headers
        .get(name)
        .map(|v| std::str::from_utf8(v.as_bytes()))
        .transpose()
        .map_err(|_| AppError::Validation(format!("header {name} is not valid UTF-8")))?
        .map(str::trim)
        .unwrap_or_default();

    if value.is_empty() {
        return Err(AppError::Validation(format!("missing header: {name}")));
    }
    Ok(value)
}
