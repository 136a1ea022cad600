//! Public player state projection
//!
//! This is the read-only view pushed to UI listeners and returned by the
//! state pull endpoint. Driver-internal fields (audio URLs, shuffle order,
//! load generations) are deliberately absent.

use serde::{Deserialize, Serialize};

use crate::track::{ArtistProfile, Source, TrackSummary};

/// Snapshot of the session as seen by UI listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicState {
    /// Active playlist in logical order
    pub playlist: Vec<TrackSummary>,
    /// Current position in the caller's coordinate space, -1 when nothing is selected
    pub current_index: i64,
    pub is_playing: bool,
    pub shuffle: bool,
    pub repeat: bool,
    /// Volume (0.0-1.0)
    pub volume: f32,
    /// Last reported playback position in seconds
    pub current_time: f64,
    /// Last reported track length in seconds
    pub duration: f64,
    /// Track most recently handed to the driver
    pub current_song: Option<TrackSummary>,
    pub loading: bool,
    pub loading_message: String,
    pub playlist_length: usize,
    pub source: Source,
    /// Present only while the artist source is active
    pub artist: Option<ArtistProfile>,
    pub favorites: Vec<TrackSummary>,
}

impl Default for PublicState {
    fn default() -> Self {
        Self {
            playlist: Vec::new(),
            current_index: -1,
            is_playing: false,
            shuffle: true,
            repeat: true,
            volume: 0.5,
            current_time: 0.0,
            duration: 0.0,
            current_song: None,
            loading: false,
            loading_message: String::new(),
            playlist_length: 0,
            source: Source::Trending,
            artist: None,
            favorites: Vec::new(),
        }
    }
}
