use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use chat_backend::{
    AppState,
    auth::issuer,
    config::Config,
    routes,
    store::{IdentityStore, MemoryStore, PgStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    // Pick the store: Postgres when a database is configured, memory otherwise
    let store: Arc<dyn IdentityStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, &config)
                .await
                .expect("Failed to connect to Postgres");
            store
                .ensure_schema()
                .await
                .expect("Failed to create database schema");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Seed the bootstrap admin
    if let (Some(id), Some(password)) = (&config.admin_id, &config.admin_password) {
        issuer::ensure_admin(store.as_ref(), &config, id, password)
            .await
            .expect("Failed to seed admin account");
    }

    // Build app state and routes
    let state = AppState::new(store, config);
    let app = routes::router(state.clone());

    // Bind and serve
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
