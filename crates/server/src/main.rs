use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfview_core::{
    load_config, validate_config, HttpBackend, ListFetcher, ListSession, MutationClient,
    PresetPersistence, PresetStoreKind, SessionOptions, SqlitePresetPersistence,
};
use shelfview_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SHELFVIEW_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Backend: {}", config.backend.base_url);
    info!("Preset store: {:?}", config.presets.store);

    // Create backend client
    let backend =
        Arc::new(HttpBackend::new(&config.backend).context("Failed to create backend client")?);

    // Create preset persistence
    let persistence: Arc<dyn PresetPersistence> = match config.presets.store {
        PresetStoreKind::Sqlite => {
            info!("Database path: {:?}", config.database.path);
            Arc::new(
                SqlitePresetPersistence::new(&config.database.path)
                    .context("Failed to create preset store")?,
            )
        }
        PresetStoreKind::Backend => Arc::clone(&backend) as Arc<dyn PresetPersistence>,
    };

    // Create list session
    let session = Arc::new(ListSession::new(
        Arc::clone(&backend) as Arc<dyn ListFetcher>,
        Arc::clone(&backend) as Arc<dyn MutationClient>,
        persistence,
        SessionOptions::from(&config.list),
    ));
    session.start(config.list.default_key.as_str()).await;
    info!("List session started");

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&session)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    session.unmount();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
