//! HTTP request handlers
//!
//! Each UI command is forwarded to the controller and acknowledged once the
//! controller has processed it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bgm_common::events::PublicState;
use bgm_common::Source;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::server::AppContext;
use crate::controller::Command;
use crate::error::Error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: f32,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    index: usize,
}

#[derive(Debug, Deserialize)]
pub struct ArtistRequest {
    handle: String,
}

#[derive(Debug, Deserialize)]
pub struct SourceRequest {
    source: Source,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    song_id: String,
}

pub type ApiError = (StatusCode, Json<StatusResponse>);

/// Map an error to its HTTP status
pub fn error_response(e: Error) -> ApiError {
    let status = match &e {
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::ControllerClosed => StatusCode::SERVICE_UNAVAILABLE,
        _ => {
            error!("Request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

async fn run_command(ctx: &AppContext, command: Command) -> Result<Json<OkResponse>, ApiError> {
    ctx.controller
        .call(command)
        .await
        .map(|_| Json(OkResponse { ok: true }))
        .map_err(error_response)
}

// ============================================================================
// Health and State
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "bgm-player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/state - Current public state
pub async fn get_state(State(ctx): State<AppContext>) -> Result<Json<PublicState>, ApiError> {
    ctx.controller
        .get_state()
        .await
        .map(Json)
        .map_err(error_response)
}

// ============================================================================
// Playback Control
// ============================================================================

/// POST /api/playback/toggle
pub async fn toggle_play_pause(State(ctx): State<AppContext>) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::TogglePlayPause).await
}

/// POST /api/playback/next
pub async fn next(State(ctx): State<AppContext>) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::Next).await
}

/// POST /api/playback/prev
pub async fn prev(State(ctx): State<AppContext>) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::Prev).await
}

/// POST /api/playback/volume - Set volume (0.0-1.0, clamped)
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::SetVolume(req.volume)).await
}

/// POST /api/playback/shuffle
pub async fn toggle_shuffle(State(ctx): State<AppContext>) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::ToggleShuffle).await
}

/// POST /api/playback/repeat
pub async fn toggle_repeat(State(ctx): State<AppContext>) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::ToggleRepeat).await
}

/// POST /api/playback/play - Play by logical playlist index
pub async fn play_song_at_index(
    State(ctx): State<AppContext>,
    Json(req): Json<PlayRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::PlaySongAtIndex(req.index)).await
}

// ============================================================================
// Playlist Sources
// ============================================================================

/// POST /api/playlist/refresh - Reload the trending list
pub async fn refresh_playlist(State(ctx): State<AppContext>) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::RefreshPlaylist).await
}

/// POST /api/playlist/artist
pub async fn load_artist(
    State(ctx): State<AppContext>,
    Json(req): Json<ArtistRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::LoadArtist(req.handle)).await
}

/// POST /api/playlist/source
pub async fn switch_source(
    State(ctx): State<AppContext>,
    Json(req): Json<SourceRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::SwitchSource(req.source)).await
}

// ============================================================================
// Favorites
// ============================================================================

/// POST /api/favorites
pub async fn add_favorite(
    State(ctx): State<AppContext>,
    Json(req): Json<FavoriteRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::AddFavorite(req.song_id)).await
}

/// DELETE /api/favorites/:id
pub async fn remove_favorite(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    run_command(&ctx, Command::RemoveFavorite(id)).await
}
