//! Cloneable front door to the controller task

use bgm_common::events::PublicState;
use tokio::sync::{mpsc, oneshot};

use super::commands::{Command, Message};
use crate::driver::DriverEvent;
use crate::error::{Error, Result};

/// Sends commands and driver events to the controller
///
/// The controller task stops once every handle is dropped.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Message>,
}

impl ControllerHandle {
    pub(crate) fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Run a command and wait until it has been processed
    ///
    /// Returns the public state right after the command.
    pub async fn call(&self, command: Command) -> Result<PublicState> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Message::Command {
                command,
                reply: Some(reply),
            })
            .await
            .map_err(|_| Error::ControllerClosed)?;

        response.await.map_err(|_| Error::ControllerClosed)?
    }

    pub async fn get_state(&self) -> Result<PublicState> {
        self.call(Command::GetState).await
    }

    /// Queue a command without waiting for it
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        self.tx
            .send(Message::Command {
                command,
                reply: None,
            })
            .await
            .map_err(|_| Error::ControllerClosed)
    }

    /// Queue an event reported by the playback driver
    pub async fn driver_event(&self, event: DriverEvent) -> Result<()> {
        self.tx
            .send(Message::Driver(event))
            .await
            .map_err(|_| Error::ControllerClosed)
    }
}
