use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::error;

use crate::error::ErrorDetail;

/// Logs every 5xx answer with the request line that produced it.
///
/// Server errors leave the service with an empty body, so this is the only
/// place the failing route and its cause are reported.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let mut response = next.run(req).await;

    if response.status().is_server_error() {
        match response.extensions_mut().remove::<ErrorDetail>() {
            Some(ErrorDetail(detail)) => error!(
                "Server error occurred - Status: {}, Request: {} {}, Cause: {}",
                response.status(),
                method,
                path,
                detail
            ),
            None => error!(
                "Server error occurred - Status: {}, Request: {} {}",
                response.status(),
                method,
                path
            ),
        }
    }

    response
}
