//! Remote playback driver
//!
//! Commands are published on a broadcast channel that the driver consumes
//! over SSE (`GET /driver/commands`). The driver acknowledges each command
//! with `POST /driver/ack`, which resolves the pending request by id.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{CommandEnvelope, DriverAck, DriverCommand, DriverError, PlaybackDriver};

type PendingMap = HashMap<Uuid, oneshot::Sender<Result<(), DriverError>>>;

/// Driver reached through the command stream and acknowledgement endpoint
#[derive(Clone)]
pub struct RemoteDriver {
    tx: broadcast::Sender<CommandEnvelope>,
    pending: Arc<Mutex<PendingMap>>,
    ack_timeout: Duration,
}

impl RemoteDriver {
    /// Create a driver channel
    ///
    /// # Arguments
    /// * `capacity` - Commands buffered per connected driver
    /// * `ack_timeout` - How long a command waits for its acknowledgement
    pub fn new(capacity: usize, ack_timeout: Duration) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            pending: Arc::new(Mutex::new(HashMap::new())),
            ack_timeout,
        }
    }

    /// Command stream for a newly connected driver
    pub fn subscribe(&self) -> broadcast::Receiver<CommandEnvelope> {
        self.tx.subscribe()
    }

    /// Number of connected drivers
    pub fn connected_drivers(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Resolve a pending command
    ///
    /// Returns `false` when no command with that id is waiting (unknown id,
    /// already timed out, or acknowledged twice).
    pub async fn acknowledge(&self, ack: DriverAck) -> bool {
        let Some(waiter) = self.pending.lock().await.remove(&ack.id) else {
            debug!("Ignoring acknowledgement for unknown command {}", ack.id);
            return false;
        };

        let result = if ack.success {
            Ok(())
        } else {
            Err(DriverError::Rejected(
                ack.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        };

        // The requester may have timed out between remove() and here
        let _ = waiter.send(result);
        true
    }

    async fn send(&self, command: DriverCommand) -> Result<(), DriverError> {
        if self.tx.receiver_count() == 0 {
            return Err(DriverError::Disconnected);
        }

        let id = Uuid::new_v4();
        let (waiter, response) = oneshot::channel();
        self.pending.lock().await.insert(id, waiter);

        debug!("Sending driver command {}: {:?}", id, command);
        if self.tx.send(CommandEnvelope { id, command }).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(DriverError::Disconnected);
        }

        match tokio::time::timeout(self.ack_timeout, response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(DriverError::Disconnected),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                warn!("Driver command {} timed out", id);
                Err(DriverError::Timeout(self.ack_timeout.as_millis() as u64))
            }
        }
    }
}

#[async_trait]
impl PlaybackDriver for RemoteDriver {
    async fn play(&self, url: &str) -> Result<(), DriverError> {
        self.send(DriverCommand::Play {
            url: url.to_string(),
        })
        .await
    }

    async fn pause(&self) -> Result<(), DriverError> {
        self.send(DriverCommand::Pause).await
    }

    async fn resume(&self) -> Result<(), DriverError> {
        self.send(DriverCommand::Resume).await
    }

    async fn set_volume(&self, volume: f32) -> Result<(), DriverError> {
        self.send(DriverCommand::SetVolume { volume }).await
    }
}
