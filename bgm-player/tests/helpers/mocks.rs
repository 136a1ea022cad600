//! Mock driver and catalog

use async_trait::async_trait;
use bgm_common::{ArtistProfile, Track};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bgm_player::catalog::{ArtistPage, CatalogError, CatalogProvider};
use bgm_player::driver::{DriverCommand, DriverError, PlaybackDriver};

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Song {}", id.to_uppercase()),
        artist: "Original Artist".to_string(),
        audio_url: audio_url(id),
        image_url: format!("https://cdn.example/{}.jpeg", id),
    }
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

pub fn audio_url(id: &str) -> String {
    format!("https://cdn.example/{}.mp3", id)
}

/// Driver that records every command it receives
#[derive(Default)]
pub struct MockDriver {
    commands: Mutex<Vec<DriverCommand>>,
    pub fail_play: AtomicBool,
    pub fail_pause: AtomicBool,
    pub fail_resume: AtomicBool,
}

impl MockDriver {
    pub fn commands(&self) -> Vec<DriverCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// URLs of every play command, in order
    pub fn played(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                DriverCommand::Play { url } => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    fn record(&self, command: DriverCommand, fail: &AtomicBool) -> Result<(), DriverError> {
        self.commands.lock().unwrap().push(command);
        if fail.load(Ordering::SeqCst) {
            Err(DriverError::Rejected("mock failure".to_string()))
        } else {
            Ok(())
        }
    }

    /// Wait until at least `count` play commands were recorded
    pub async fn wait_for_plays(&self, count: usize) -> Vec<String> {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let played = self.played();
                if played.len() >= count {
                    return played;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Timed out waiting for play commands")
    }
}

#[async_trait]
impl PlaybackDriver for MockDriver {
    async fn play(&self, url: &str) -> Result<(), DriverError> {
        self.record(
            DriverCommand::Play {
                url: url.to_string(),
            },
            &self.fail_play,
        )
    }

    async fn pause(&self) -> Result<(), DriverError> {
        self.record(DriverCommand::Pause, &self.fail_pause)
    }

    async fn resume(&self) -> Result<(), DriverError> {
        self.record(DriverCommand::Resume, &self.fail_resume)
    }

    async fn set_volume(&self, volume: f32) -> Result<(), DriverError> {
        self.commands
            .lock()
            .unwrap()
            .push(DriverCommand::SetVolume { volume });
        Ok(())
    }
}

/// Catalog answering from a script
///
/// A `None` list means the fetch fails with a network error.
#[derive(Default)]
pub struct MockCatalog {
    trending: Mutex<Option<Vec<Track>>>,
    trending_delay: Mutex<Duration>,
    artists: Mutex<HashMap<String, ArtistPage>>,
}

impl MockCatalog {
    pub fn with_trending(tracks: Vec<Track>) -> Self {
        let catalog = Self::default();
        catalog.set_trending(Some(tracks));
        catalog
    }

    pub fn set_trending(&self, tracks: Option<Vec<Track>>) {
        *self.trending.lock().unwrap() = tracks;
    }

    pub fn set_trending_delay(&self, delay: Duration) {
        *self.trending_delay.lock().unwrap() = delay;
    }

    pub fn add_artist(&self, handle: &str, display_name: &str, tracks: Vec<Track>) {
        self.artists.lock().unwrap().insert(
            handle.to_string(),
            ArtistPage {
                profile: ArtistProfile {
                    handle: handle.to_string(),
                    display_name: display_name.to_string(),
                    avatar_url: format!("https://cdn.example/{}.png", handle),
                },
                tracks,
            },
        );
    }
}

#[async_trait]
impl CatalogProvider for MockCatalog {
    async fn fetch_trending(&self) -> Result<Vec<Track>, CatalogError> {
        let delay = *self.trending_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.trending
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CatalogError::Network("connection refused".to_string()))
    }

    async fn fetch_artist(&self, handle: &str) -> Result<ArtistPage, CatalogError> {
        self.artists
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .ok_or(CatalogError::Status(404))
    }
}
