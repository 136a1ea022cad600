//! # BGM Common Library
//!
//! Shared code for the background music player workspace:
//! - Track and artist domain types
//! - Event types (PlayerEvent enum) and the EventBus
//! - Configuration file discovery
//! - SSE stream helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;
pub mod track;

pub use error::{Error, Result};
pub use track::{ArtistProfile, Source, Track, TrackSummary};
