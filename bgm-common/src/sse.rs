//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE plumbing: turns a broadcast receiver into an axum SSE response.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::events::PlayerEvent;

/// Items that can be sent as named SSE events
pub trait SseEventName {
    /// Value of the SSE `event:` field
    fn event_name(&self) -> &'static str;
}

impl SseEventName for PlayerEvent {
    fn event_name(&self) -> &'static str {
        self.event_type()
    }
}

/// Convert one item to an SSE event, `None` if it cannot be serialized
pub fn to_sse_event<T: SseEventName + Serialize>(item: &T) -> Option<Event> {
    match serde_json::to_string(item) {
        Ok(json) => Some(Event::default().event(item.event_name()).data(json)),
        Err(e) => {
            warn!("Failed to serialize SSE event: {}", e);
            None
        }
    }
}

/// Stream a broadcast channel to one SSE client
///
/// `initial` is sent first so a freshly connected client does not have to
/// wait for the next change. Lagged receivers skip the missed items and keep
/// going; the stream ends when the sender side is dropped.
///
/// # Arguments
/// * `stream_name` - Name used in log lines (e.g., "state", "driver")
pub fn broadcast_sse<T>(
    stream_name: &'static str,
    initial: Option<T>,
    mut rx: broadcast::Receiver<T>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: SseEventName + Serialize + Clone + Send + 'static,
{
    info!("New SSE client connected to {} stream", stream_name);

    let stream = async_stream::stream! {
        if let Some(item) = initial {
            if let Some(event) = to_sse_event(&item) {
                yield Ok(event);
            }
        }

        loop {
            match rx.recv().await {
                Ok(item) => {
                    debug!("SSE {}: sending {}", stream_name, item.event_name());
                    if let Some(event) = to_sse_event(&item) {
                        yield Ok(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE {} client lagged, skipped {} events", stream_name, skipped);
                }
                Err(RecvError::Closed) => {
                    info!("SSE {} stream closed", stream_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
