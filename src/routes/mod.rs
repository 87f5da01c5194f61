use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::{AppState, middleware::log_errors};

pub mod admin;
pub mod user;

/// Builds the full application router with its state attached.
pub fn router(state: AppState) -> Router {
    // JSON API, credentials travel in headers
    let api_routes = Router::new()
        .route("/users", get(user::list_users))
        .route("/signup", get(user::signup))
        .route("/login/user", get(user::login))
        .route("/login/admin", get(admin::login))
        .route("/user/profile", post(user::update_profile))
        .route("/admin/ban", post(admin::ban));

    let router = Router::new()
        .route("/debug", get(debug))
        .nest("/api", api_routes)
        // log_errors sits inside TraceLayer so its report shares the request span
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http());

    // permissive CORS only for local development
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}

/// Liveness check.
async fn debug() -> Json<Value> {
    Json(json!({ "message": "hello" }))
}
