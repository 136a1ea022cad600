//! Playback driver callbacks

use axum::{extract::State, http::StatusCode, Json};
use tracing::debug;

use super::handlers::{error_response, ApiError, OkResponse, StatusResponse};
use crate::api::server::AppContext;
use crate::driver::{DriverAck, DriverEvent};

/// POST /driver/ack - Acknowledge one command from the command stream
///
/// 404 when the command is unknown or already timed out.
pub async fn acknowledge(
    State(ctx): State<AppContext>,
    Json(ack): Json<DriverAck>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = ack.id;
    if ctx.driver.acknowledge(ack).await {
        Ok(Json(OkResponse { ok: true }))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(StatusResponse {
                status: format!("error: no pending command {}", id),
            }),
        ))
    }
}

/// POST /driver/events - Report a playback event
pub async fn report_event(
    State(ctx): State<AppContext>,
    Json(event): Json<DriverEvent>,
) -> Result<Json<OkResponse>, ApiError> {
    debug!("Driver event: {:?}", event);
    ctx.controller
        .driver_event(event)
        .await
        .map(|_| Json(OkResponse { ok: true }))
        .map_err(error_response)
}
