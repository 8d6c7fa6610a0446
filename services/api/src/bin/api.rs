//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, ForestClassifier},
    config::Config,
    error::ApiError,
    web::{self, session::session_key, AppState, SessionSettings},
};
use std::sync::Arc;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(?config, "Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_adapter = Arc::new(DbAdapter::connect(&config.database_url).await?);
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Session Store ---
    let session_store = SqliteStore::new(db_adapter.pool().clone());
    session_store.migrate().await?;
    let deletion_task = tokio::spawn(
        session_store
            .clone()
            .continuously_delete_expired(tokio::time::Duration::from_secs(60)),
    );

    if config.secret_key.is_none() {
        warn!("SECRET_KEY is not set; using an ephemeral key. Sessions will not survive a restart.");
    }
    let settings = SessionSettings {
        key: session_key(config.secret_key.as_deref()),
        secure: config.secure_cookies,
        idle: time::Duration::minutes(config.session_idle_minutes),
    };

    // --- 4. Load the Model & Build the Shared AppState ---
    let classifier = Arc::new(ForestClassifier::load(&config.model_path).await?);
    let app_state = Arc::new(AppState::new(db_adapter, classifier));

    // --- 5. Create the Web Router ---
    let app = web::app(app_state, session_store, settings);

    // --- 6. Start the Server ---
    info!("Starting server on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    deletion_task.abort();
    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
