use announcement_board::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{KvRepository, RepositoryState},
    storage,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, the key-value store binding and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise verbose for this crate, request-level for the HTTP stack.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "announcement_board=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    if config.auth.secret.is_none() {
        tracing::warn!("AUTH_KEY is not set, the board is open to everyone");
    }

    // 4. Key-Value Store Binding
    let store = storage::connect(&config.store).await;
    match &store {
        Some(_) => tracing::info!("Key-value store bound: {:?}", config.store.backend),
        None => tracing::warn!("No key-value store bound, data routes will report it unavailable"),
    }
    let repo = Arc::new(KvRepository::new(store, config.list_limit)) as RepositoryState;

    // 5. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let home = config.home_path();
    let docs_enabled = config.api_docs;
    let app = create_router(AppState { repo, config });

    // 6. Server Startup
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("Announcement board mounted at {}", home);
    if docs_enabled {
        tracing::info!("OpenAPI document available at /api-docs/openapi.json");
    }

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
