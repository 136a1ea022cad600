//! Controller inbound messages

use bgm_common::events::PublicState;
use bgm_common::{ArtistProfile, Source, Track};
use tokio::sync::oneshot;

use crate::catalog::CatalogError;
use crate::driver::DriverEvent;
use crate::error::Result;

/// UI command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetState,
    TogglePlayPause,
    Next,
    Prev,
    /// Volume (0.0-1.0), clamped
    SetVolume(f32),
    ToggleShuffle,
    ToggleRepeat,
    /// Reload the trending list
    RefreshPlaylist,
    /// Load an artist's list; accepts `name`, `@name` or a profile URL
    LoadArtist(String),
    SwitchSource(Source),
    AddFavorite(String),
    RemoveFavorite(String),
    /// Play by logical index (position in the unshuffled playlist)
    PlaySongAtIndex(usize),
}

impl Command {
    /// Commands that only read state
    pub fn is_query(&self) -> bool {
        matches!(self, Command::GetState)
    }
}

/// List to fetch
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    Trending,
    Artist(String),
}

impl LoadRequest {
    pub fn source(&self) -> Source {
        match self {
            LoadRequest::Trending => Source::Trending,
            LoadRequest::Artist(_) => Source::Artist,
        }
    }

    /// Progress text shown while the fetch is outstanding
    pub fn loading_message(&self) -> String {
        match self {
            LoadRequest::Trending => "Loading trending tracks...".to_string(),
            LoadRequest::Artist(handle) => format!("Loading tracks by @{}...", handle),
        }
    }
}

/// Raw result of one fetch
#[derive(Debug, Clone)]
pub struct FetchedList {
    pub tracks: Vec<Track>,
    pub profile: Option<ArtistProfile>,
}

pub(crate) type Reply = oneshot::Sender<Result<PublicState>>;

/// Everything the controller task consumes, in arrival order
pub(crate) enum Message {
    Command {
        command: Command,
        reply: Option<Reply>,
    },
    Driver(DriverEvent),
    CatalogLoaded {
        generation: u64,
        request: LoadRequest,
        result: std::result::Result<FetchedList, CatalogError>,
    },
}
