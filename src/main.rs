use staff_api::{
    AppState, JsonFileRepository, RepositoryState,
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point, responsible for initializing all core components:
/// configuration, logging, the file-backed store (with first-boot seeding), and the
/// HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, with sensible local defaults otherwise.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "staff_api=debug,tower_http=info,axum=trace".into());

    // 3. Structured logging, format selected by environment.
    match config.env {
        Env::Local => {
            // Pretty print for human readability during local debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Store initialization: create the data directory and seed the collections
    // on first boot (bcrypt-hashing the seed passwords, which takes a moment).
    let store = JsonFileRepository::new(config.data_dir.clone());
    store
        .seed()
        .await
        .expect("FATAL: Failed to initialise the data store. Check DATA_DIR.");
    let repo = Arc::new(store) as RepositoryState;

    // 5. Unified state assembly: auth + directory services wired around the store.
    let app_state = AppState::new(repo, config.clone());

    // 6. Router and server startup.
    let app = create_router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("FATAL: Failed to bind the server port.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:{}", config.port);
    tracing::info!(
        "API Documentation (Swagger UI) available at: http://localhost:{}/swagger-ui",
        config.port
    );

    axum::serve(listener, app)
        .await
        .expect("FATAL: Server error.");
}
