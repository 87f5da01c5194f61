use std::sync::Arc;

use config::Config;
use store::IdentityStore;

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IdentityStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn IdentityStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
