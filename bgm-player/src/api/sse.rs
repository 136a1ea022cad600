//! Server-Sent Events endpoints

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use bgm_common::events::PlayerEvent;
use bgm_common::sse::broadcast_sse;
use futures::stream::Stream;
use std::convert::Infallible;
use tracing::warn;

use crate::api::server::AppContext;

/// GET /events - State update stream
///
/// Starts with the current state so a new listener renders immediately.
pub async fn state_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before asking for the state so no update falls in between
    let rx = ctx.events.subscribe();

    let initial = match ctx.controller.get_state().await {
        Ok(state) => Some(PlayerEvent::state_update(state)),
        Err(e) => {
            warn!("No initial state for SSE client: {}", e);
            None
        }
    };

    broadcast_sse("state", initial, rx)
}

/// GET /driver/commands - Command stream for the playback driver
pub async fn driver_command_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    broadcast_sse("driver", None, ctx.driver.subscribe())
}
