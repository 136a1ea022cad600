//! Track list acquisition
//!
//! The controller never talks to the network directly; it asks a
//! [`CatalogProvider`] for the trending list or an artist's list. Results are
//! raw and must pass through [`bgm_common::track::ingest_tracks`] before use.

pub mod http;

pub use http::HttpCatalog;

use async_trait::async_trait;
use bgm_common::{ArtistProfile, Track};
use thiserror::Error;

/// Catalog fetch errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog returned HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One artist's page: profile plus tracks
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistPage {
    pub profile: ArtistProfile,
    pub tracks: Vec<Track>,
}

/// Source of track lists
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Current trending list (may be empty)
    async fn fetch_trending(&self) -> Result<Vec<Track>, CatalogError>;

    /// List published by the artist with `handle` (bare handle, no `@`)
    async fn fetch_artist(&self, handle: &str) -> Result<ArtistPage, CatalogError>;
}
