use cosmogenesis::api::{self, AppState};
use cosmogenesis::config::ServiceConfig;
use cosmogenesis_io::UniverseStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cosmogenesis=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    let store = match UniverseStore::open(&config.database_path) {
        Ok(store) => {
            tracing::info!("Initialized universe store: {}", config.database_path);
            store
        }
        Err(e) => {
            tracing::error!("Failed to initialize storage: {e}");
            std::process::exit(1);
        }
    };

    if config.verbose_errors {
        tracing::warn!("Development mode: internal error detail is exposed to clients");
    }

    let state = Arc::new(AppState::new(
        store,
        config.auth_secret.clone(),
        config.verbose_errors,
    ));
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Cosmogenesis listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
