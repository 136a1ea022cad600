//! BGM Player (bgm-player) - Main entry point
//!
//! Loads configuration and persisted settings, starts the controller task and
//! serves the HTTP/SSE control API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bgm_common::config::resolve_config_file;
use bgm_common::events::EventBus;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bgm_player::api::{self, AppContext};
use bgm_player::catalog::HttpCatalog;
use bgm_player::config::{Config, CONFIG_FILE_NAME};
use bgm_player::controller::{self, Controller, Session};
use bgm_player::db;
use bgm_player::driver::RemoteDriver;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "bgm-player")]
#[command(about = "Background music player controller")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "BGM_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "BGM_PORT")]
    port: Option<u16>,

    /// SQLite settings database (overrides config file)
    #[arg(short, long, env = "BGM_DATABASE")]
    database: Option<PathBuf>,

    /// Catalog base URL (overrides config file)
    #[arg(long, env = "BGM_CATALOG_URL")]
    catalog_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_file(args.config.as_deref(), "BGM_CONFIG", CONFIG_FILE_NAME);
    let mut config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("bgm_player={},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = &config_path {
        info!("Configuration loaded from {}", path.display());
    }

    // CLI overrides
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = Some(database);
    }
    if let Some(url) = args.catalog_url {
        config.catalog.base_url = url;
    }

    info!("Starting BGM Player v{} on port {}", env!("CARGO_PKG_VERSION"), config.port);

    let db_path = config.database_path();
    let db_pool = db::connect(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let persisted = match db::settings::load_persisted(&db_pool).await {
        Ok(persisted) => persisted,
        Err(e) => {
            warn!("Failed to load persisted settings, using defaults: {}", e);
            Default::default()
        }
    };
    info!(
        "Restored settings: volume={:.2}, shuffle={}, repeat={}, source={}, {} favorites",
        persisted.volume,
        persisted.shuffle,
        persisted.repeat,
        persisted.source,
        persisted.favorites.len()
    );

    let events = Arc::new(EventBus::new(config.events.capacity));
    let driver = Arc::new(RemoteDriver::new(
        config.driver.command_capacity,
        config.driver.ack_timeout(),
    ));
    let catalog = Arc::new(HttpCatalog::new(&config.catalog).context("Failed to build catalog client")?);

    let first_command = controller::initial_command(&persisted);
    let (controller, handle) = Controller::new(
        Session::from_persisted(persisted),
        driver.clone(),
        catalog,
        db_pool.clone(),
        Arc::clone(&events),
        config.playback.clone(),
    );
    let controller_task = controller.spawn();

    handle
        .dispatch(first_command)
        .await
        .context("Controller stopped during startup")?;

    let ctx = AppContext {
        controller: handle,
        events,
        driver,
        port: config.port,
    };

    api::server::run(ctx, shutdown_signal())
        .await
        .context("Server error")?;

    // Router (and with it the last controller handle) is gone; let the task drain
    if let Err(e) = controller_task.await {
        warn!("Controller task ended abnormally: {}", e);
    }
    db_pool.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
