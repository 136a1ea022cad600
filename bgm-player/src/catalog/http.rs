//! HTTP catalog client
//!
//! Reads track lists from a JSON feed:
//! - `GET {base_url}/playlists/{id}` returns `{"tracks": [...]}`
//! - `GET {base_url}/artists/{handle}` returns `{"artist": {...}, "tracks": [...]}`

use async_trait::async_trait;
use bgm_common::{ArtistProfile, Track};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ArtistPage, CatalogError, CatalogProvider};
use crate::config::CatalogConfig;

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct ArtistResponse {
    #[serde(default)]
    artist: Option<ArtistProfile>,
    #[serde(default)]
    tracks: Vec<Track>,
}

/// Catalog backed by a JSON feed over HTTP
pub struct HttpCatalog {
    http_client: reqwest::Client,
    base_url: String,
    trending_playlist_id: String,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            trending_playlist_id: config.trending_playlist_id.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        debug!("Fetching {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn fetch_trending(&self) -> Result<Vec<Track>, CatalogError> {
        let url = format!("{}/playlists/{}", self.base_url, self.trending_playlist_id);
        let response: PlaylistResponse = self.get_json(&url).await?;
        Ok(response.tracks)
    }

    async fn fetch_artist(&self, handle: &str) -> Result<ArtistPage, CatalogError> {
        let url = format!("{}/artists/{}", self.base_url, handle);
        let response: ArtistResponse = self.get_json(&url).await?;

        let profile = response.artist.unwrap_or_else(|| ArtistProfile {
            handle: handle.to_string(),
            display_name: handle.to_string(),
            avatar_url: String::new(),
        });

        Ok(ArtistPage {
            profile,
            tracks: response.tracks,
        })
    }
}
