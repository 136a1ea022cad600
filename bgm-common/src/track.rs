//! Track, artist and source types shared by the player and its clients

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::{Error, Result};

/// A single playable song entry
///
/// Identity is `id`; two tracks with the same id are the same track even if
/// the remaining fields differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque track identifier
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Artist display name (may be empty)
    #[serde(default)]
    pub artist: String,
    /// URL handed to the playback driver
    pub audio_url: String,
    /// Cover art URL
    #[serde(default)]
    pub image_url: String,
}

impl Track {
    /// Public projection without the audio URL
    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            artist: self.artist.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Track as shown to UI listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub image_url: String,
}

/// Profile of the artist whose list is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistProfile {
    /// Handle without the leading `@`
    pub handle: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Which collection is the active playlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Trending,
    Artist,
    Favorites,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Trending => write!(f, "trending"),
            Source::Artist => write!(f, "artist"),
            Source::Favorites => write!(f, "favorites"),
        }
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trending" => Ok(Source::Trending),
            "artist" => Ok(Source::Artist),
            "favorites" => Ok(Source::Favorites),
            other => Err(Error::InvalidInput(format!("Unknown source: {}", other))),
        }
    }
}

/// Normalize a freshly fetched track list
///
/// Drops duplicate ids (first occurrence wins) and gives untitled tracks a
/// positional placeholder title.
pub fn ingest_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Track> = tracks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();

    for (i, track) in unique.iter_mut().enumerate() {
        if track.title.trim().is_empty() {
            track.title = format!("Track #{}", i + 1);
        }
    }

    unique
}

/// Reduce user input to a bare artist handle
///
/// Accepts `name`, `@name`, `https://host/@name` and trailing slashes.
/// Returns `None` when nothing usable remains.
pub fn normalize_handle(input: &str) -> Option<String> {
    let mut handle = input.trim();

    for scheme in ["https://", "http://"] {
        if let Some(rest) = handle.strip_prefix(scheme) {
            // Drop the host part
            handle = rest.split_once('/').map(|(_, path)| path).unwrap_or("");
            break;
        }
    }

    let handle = handle.trim_start_matches('@').trim_end_matches('/');

    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str) -> Track {
        Track {
            id: id.to_string(),
            title: title.to_string(),
            artist: String::new(),
            audio_url: format!("https://cdn.example/{}.mp3", id),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_ingest_drops_duplicates_first_wins() {
        let tracks = vec![track("a", "First"), track("b", "B"), track("a", "Second")];
        let ingested = ingest_tracks(tracks);

        assert_eq!(ingested.len(), 2);
        assert_eq!(ingested[0].title, "First");
        assert_eq!(ingested[1].id, "b");
    }

    #[test]
    fn test_ingest_fills_missing_titles() {
        let tracks = vec![track("a", "Named"), track("b", ""), track("c", "  ")];
        let ingested = ingest_tracks(tracks);

        assert_eq!(ingested[0].title, "Named");
        assert_eq!(ingested[1].title, "Track #2");
        assert_eq!(ingested[2].title, "Track #3");
    }

    #[test]
    fn test_summary_omits_audio_url() {
        let json = serde_json::to_value(track("a", "A").summary()).unwrap();
        assert!(json.get("audio_url").is_none());
        assert_eq!(json["id"], "a");
    }

    #[test]
    fn test_source_round_trip_strings() {
        assert_eq!("favorites".parse::<Source>().unwrap(), Source::Favorites);
        assert_eq!(Source::Artist.to_string(), "artist");
        assert!("radio".parse::<Source>().is_err());
        assert_eq!(serde_json::to_string(&Source::Trending).unwrap(), "\"trending\"");
    }

    #[test]
    fn test_default_source_is_trending() {
        assert_eq!(Source::default(), Source::Trending);
    }

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("dj"), Some("dj".to_string()));
        assert_eq!(normalize_handle(" @dj "), Some("dj".to_string()));
        assert_eq!(normalize_handle("https://music.example/@dj/"), Some("dj".to_string()));
        assert_eq!(normalize_handle("http://music.example/dj"), Some("dj".to_string()));
        assert_eq!(normalize_handle("@"), None);
        assert_eq!(normalize_handle("   "), None);
    }
}
