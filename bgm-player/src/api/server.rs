//! HTTP server setup and routing

use axum::{
    routing::{delete, get, post},
    Router,
};
use bgm_common::events::EventBus;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{driver, handlers, sse};
use crate::controller::ControllerHandle;
use crate::driver::RemoteDriver;
use crate::error::{Error, Result};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub controller: ControllerHandle,
    pub events: Arc<EventBus>,
    pub driver: Arc<RemoteDriver>,
    pub port: u16,
}

/// Build the router with every route attached
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))
        // State
        .route("/api/state", get(handlers::get_state))
        // Playback control
        .route("/api/playback/toggle", post(handlers::toggle_play_pause))
        .route("/api/playback/next", post(handlers::next))
        .route("/api/playback/prev", post(handlers::prev))
        .route("/api/playback/volume", post(handlers::set_volume))
        .route("/api/playback/shuffle", post(handlers::toggle_shuffle))
        .route("/api/playback/repeat", post(handlers::toggle_repeat))
        .route("/api/playback/play", post(handlers::play_song_at_index))
        // Playlist sources
        .route("/api/playlist/refresh", post(handlers::refresh_playlist))
        .route("/api/playlist/artist", post(handlers::load_artist))
        .route("/api/playlist/source", post(handlers::switch_source))
        // Favorites
        .route("/api/favorites", post(handlers::add_favorite))
        .route("/api/favorites/:id", delete(handlers::remove_favorite))
        // SSE state stream
        .route("/events", get(sse::state_stream))
        // Playback driver channel
        .route("/driver/commands", get(sse::driver_command_stream))
        .route("/driver/ack", post(driver::acknowledge))
        .route("/driver/events", post(driver::report_event))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Serve the API until `shutdown` resolves
pub async fn run(ctx: AppContext, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.port));
    let app = create_router(ctx);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
