//! Session state and navigation rules
//!
//! Pure state: no I/O, no driver, no clock. The controller task applies these
//! transitions and performs the side effects (driver commands, persistence,
//! broadcasts) around them.
//!
//! Two index spaces coexist. A *logical* index points into `playlist`
//! directly. A *sequential* index is a position in play order; with shuffle on
//! it is mapped to a logical index through `shuffled_order`. `current_index`
//! is kept in the sequential space so that "next" stays monotonic under
//! shuffle.

use bgm_common::events::PublicState;
use bgm_common::{ArtistProfile, Source, Track};
use rand::seq::SliceRandom;

use crate::db::settings::PersistedSettings;

/// Outcome of advancing to the next track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Play the given sequential index
    Play(usize),
    /// End of list without repeat; transport stopped
    Stopped,
    /// Empty playlist, nothing happened
    Idle,
}

/// The single mutable record owned by the controller
#[derive(Debug, Clone)]
pub struct Session {
    pub playlist: Vec<Track>,
    /// Sequential index of the loaded track, `None` when nothing is selected
    pub current_index: Option<usize>,
    /// Permutation of `0..playlist.len()`; unused while shuffle is off
    pub shuffled_order: Vec<usize>,
    pub is_playing: bool,
    pub shuffle: bool,
    pub repeat: bool,
    pub volume: f32,
    pub current_time: f64,
    pub duration: f64,
    /// Detached copy of the track last handed to the driver
    pub current_song: Option<Track>,
    pub source: Source,
    pub artist: Option<ArtistProfile>,
    pub favorites: Vec<Track>,
    pub loading: bool,
    pub loading_message: String,
    /// Bumped by every load; only the latest load may complete
    pub load_generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_persisted(PersistedSettings::default())
    }
}

impl Session {
    /// Fresh session seeded with restored settings
    pub fn from_persisted(settings: PersistedSettings) -> Self {
        Self {
            playlist: Vec::new(),
            current_index: None,
            shuffled_order: Vec::new(),
            is_playing: false,
            shuffle: settings.shuffle,
            repeat: settings.repeat,
            volume: settings.volume,
            current_time: 0.0,
            duration: 0.0,
            current_song: None,
            source: settings.source,
            artist: None,
            favorites: settings.favorites,
            loading: false,
            loading_message: String::new(),
            load_generation: 0,
        }
    }

    /// Map a sequential index to a logical one
    ///
    /// Returns `None` for an empty playlist.
    pub fn resolve(&self, index: usize) -> Option<usize> {
        if self.playlist.is_empty() {
            return None;
        }

        if self.shuffle && !self.shuffled_order.is_empty() {
            Some(self.shuffled_order[index % self.shuffled_order.len()])
        } else {
            Some(index % self.playlist.len())
        }
    }

    /// Draw a new uniform permutation of the playlist positions
    pub fn regenerate_shuffle(&mut self) {
        let mut order: Vec<usize> = (0..self.playlist.len()).collect();
        order.shuffle(&mut rand::thread_rng());
        self.shuffled_order = order;
    }

    /// Select the track at sequential `index` and mark it playing
    ///
    /// Returns the track whose URL must be sent to the driver, or `None` (and
    /// no state change) when the playlist is empty.
    pub fn begin_play(&mut self, index: usize) -> Option<Track> {
        let logical = self.resolve(index)?;
        let track = self.playlist.get(logical)?.clone();

        let mut snapshot = track.clone();
        if let Some(artist) = &self.artist {
            snapshot.artist = artist.display_name.clone();
        }

        self.current_index = Some(index % self.playlist.len());
        self.current_song = Some(snapshot);
        self.is_playing = true;
        self.current_time = 0.0;
        self.duration = 0.0;

        Some(track)
    }

    /// Work out what "next" means from the current position
    pub fn advance(&mut self) -> Advance {
        if self.playlist.is_empty() {
            return Advance::Idle;
        }

        let next = self.current_index.map_or(0, |i| i + 1);
        if next < self.playlist.len() {
            return Advance::Play(next);
        }

        if self.repeat {
            if self.shuffle {
                self.regenerate_shuffle();
            }
            Advance::Play(0)
        } else {
            self.is_playing = false;
            self.current_time = 0.0;
            Advance::Stopped
        }
    }

    /// Sequential index "previous" should play
    ///
    /// Past `restart_threshold` seconds into the track this is the current
    /// index (restart).
    pub fn previous_index(&self, restart_threshold: f64) -> Option<usize> {
        if self.playlist.is_empty() {
            return None;
        }

        let current = self.current_index.unwrap_or(0);
        if self.current_time > restart_threshold {
            return Some(current);
        }

        match current.checked_sub(1) {
            Some(prev) => Some(prev),
            None if self.repeat => Some(self.playlist.len() - 1),
            None => Some(0),
        }
    }

    /// Sequential index that plays logical `index`
    pub fn sequential_position(&self, index: usize) -> Option<usize> {
        if index >= self.playlist.len() {
            return None;
        }

        if self.shuffle && !self.shuffled_order.is_empty() {
            self.shuffled_order.iter().position(|&i| i == index)
        } else {
            Some(index)
        }
    }

    /// Install a freshly loaded list
    pub fn replace_playlist(&mut self, tracks: Vec<Track>) {
        self.playlist = tracks;
        self.regenerate_shuffle();
        self.current_index = None;
        self.current_song = None;
    }

    /// Start a load; returns the generation the result must carry
    pub fn begin_load(&mut self, source: Source, message: String) -> u64 {
        self.load_generation += 1;
        self.loading = true;
        self.loading_message = message;
        self.source = source;
        if source != Source::Artist {
            self.artist = None;
        }
        self.load_generation
    }

    /// Make the favorites collection the active playlist
    ///
    /// Any load still in flight is superseded.
    pub fn activate_favorites(&mut self) {
        self.load_generation += 1;
        self.loading = false;
        self.loading_message.clear();
        self.source = Source::Favorites;
        self.artist = None;
        self.sync_favorites_playlist();
        self.current_index = None;
        self.current_song = None;
    }

    /// Append the track with `id` to favorites
    ///
    /// The track is looked up in the active playlist, then in the current
    /// song. Returns `false` when it is unknown or already a favorite.
    pub fn add_favorite(&mut self, id: &str) -> bool {
        if self.favorites.iter().any(|t| t.id == id) {
            return false;
        }

        let found = self
            .playlist
            .iter()
            .find(|t| t.id == id)
            .or_else(|| self.current_song.as_ref().filter(|t| t.id == id))
            .cloned();

        match found {
            Some(track) => {
                self.favorites.push(track);
                if self.source == Source::Favorites {
                    self.sync_favorites_playlist();
                }
                true
            }
            None => false,
        }
    }

    /// Drop the favorite with `id`; returns `false` if it was not present
    ///
    /// Playback is not interrupted even if the removed track is playing.
    pub fn remove_favorite(&mut self, id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|t| t.id != id);
        if self.favorites.len() == before {
            return false;
        }

        if self.source == Source::Favorites {
            self.sync_favorites_playlist();
        }
        true
    }

    fn sync_favorites_playlist(&mut self) {
        self.playlist = self.favorites.clone();
        self.regenerate_shuffle();
        if self
            .current_index
            .is_some_and(|i| i >= self.playlist.len())
        {
            self.current_index = None;
        }
    }

    /// Read-only projection for listeners
    pub fn public_state(&self) -> PublicState {
        PublicState {
            playlist: self.playlist.iter().map(Track::summary).collect(),
            current_index: self.current_index.map_or(-1, |i| i as i64),
            is_playing: self.is_playing,
            shuffle: self.shuffle,
            repeat: self.repeat,
            volume: self.volume,
            current_time: self.current_time,
            duration: self.duration,
            current_song: self.current_song.as_ref().map(Track::summary),
            loading: self.loading,
            loading_message: self.loading_message.clone(),
            playlist_length: self.playlist.len(),
            source: self.source,
            artist: self.artist.clone(),
            favorites: self.favorites.iter().map(Track::summary).collect(),
        }
    }
}
