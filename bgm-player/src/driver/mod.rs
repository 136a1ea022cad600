//! Playback driver protocol
//!
//! The driver is the component that actually renders audio. It runs in a
//! separate execution context and is reached through asynchronous
//! request/response messaging: the controller sends [`DriverCommand`]s and
//! awaits an acknowledgement; the driver independently reports
//! [`DriverEvent`]s.

pub mod remote;

pub use remote::RemoteDriver;

use async_trait::async_trait;
use bgm_common::sse::SseEventName;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Driver command failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// No driver is connected to receive commands
    #[error("No playback driver connected")]
    Disconnected,

    /// The driver did not acknowledge in time
    #[error("Driver did not acknowledge within {0} ms")]
    Timeout(u64),

    /// The driver refused or failed the command
    #[error("Driver rejected command: {0}")]
    Rejected(String),
}

/// Transport controls offered by a playback driver
///
/// Every call resolves once the driver acknowledged (or failed) the command.
#[async_trait]
pub trait PlaybackDriver: Send + Sync {
    /// Load and start playing `url`
    async fn play(&self, url: &str) -> Result<(), DriverError>;

    async fn pause(&self) -> Result<(), DriverError>;

    async fn resume(&self) -> Result<(), DriverError>;

    /// Volume (0.0-1.0)
    async fn set_volume(&self, volume: f32) -> Result<(), DriverError>;
}

/// Outbound command (controller -> driver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DriverCommand {
    Play { url: String },
    Pause,
    Resume,
    SetVolume { volume: f32 },
}

/// Command plus the request id the driver must echo in its acknowledgement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: Uuid,
    #[serde(flatten)]
    pub command: DriverCommand,
}

impl SseEventName for CommandEnvelope {
    fn event_name(&self) -> &'static str {
        "DriverCommand"
    }
}

/// Driver reply to one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAck {
    pub id: Uuid,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Inbound event (driver -> controller)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverEvent {
    /// Current track played to the end
    SongEnded,
    /// Position report, throttled by the driver to at most once per second
    TimeUpdate { current_time: f64, duration: f64 },
    /// Audio actually started
    PlaybackStarted,
    /// Audio element failed
    PlaybackError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_envelope_wire_format() {
        let envelope = CommandEnvelope {
            id: Uuid::nil(),
            command: DriverCommand::Play {
                url: "https://cdn.example/a.mp3".to_string(),
            },
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["action"], "play");
        assert_eq!(json["url"], "https://cdn.example/a.mp3");
        assert_eq!(json["id"], Uuid::nil().to_string());

        let pause = serde_json::to_value(CommandEnvelope {
            id: Uuid::nil(),
            command: DriverCommand::Pause,
        })
        .unwrap();
        assert_eq!(pause["action"], "pause");
    }

    #[test]
    fn test_driver_event_parsing() {
        let event: DriverEvent =
            serde_json::from_str(r#"{"type":"time_update","current_time":12.5,"duration":180.0}"#)
                .unwrap();
        assert_eq!(
            event,
            DriverEvent::TimeUpdate {
                current_time: 12.5,
                duration: 180.0
            }
        );

        let event: DriverEvent = serde_json::from_str(r#"{"type":"song_ended"}"#).unwrap();
        assert_eq!(event, DriverEvent::SongEnded);

        let event: DriverEvent =
            serde_json::from_str(r#"{"type":"playback_error","message":"decode"}"#).unwrap();
        assert_eq!(
            event,
            DriverEvent::PlaybackError {
                message: "decode".to_string()
            }
        );
    }

    #[test]
    fn test_ack_error_is_optional() {
        let ack: DriverAck =
            serde_json::from_str(&format!(r#"{{"id":"{}","success":true}}"#, Uuid::nil())).unwrap();
        assert!(ack.success);
        assert_eq!(ack.error, None);
    }
}
