//! Controller task
//!
//! Owns the [`Session`] and applies every command, driver event and finished
//! fetch strictly in arrival order. Driver commands are awaited inline;
//! catalog fetches run in spawned tasks and come back as messages.

use bgm_common::events::{EventBus, PlayerEvent};
use bgm_common::track::{ingest_tracks, normalize_handle};
use bgm_common::{ArtistProfile, Source};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::commands::{Command, FetchedList, LoadRequest, Message};
use super::handle::ControllerHandle;
use super::session::{Advance, Session};
use crate::catalog::{CatalogError, CatalogProvider};
use crate::config::PlaybackConfig;
use crate::db::settings;
use crate::driver::{DriverEvent, PlaybackDriver};
use crate::error::{Error, Result};

/// Inbound queue depth
const QUEUE_CAPACITY: usize = 64;

/// Playlist/playback controller
pub struct Controller {
    session: Session,
    driver: Arc<dyn PlaybackDriver>,
    catalog: Arc<dyn CatalogProvider>,
    db: Pool<Sqlite>,
    events: Arc<EventBus>,
    playback: PlaybackConfig,
    rx: mpsc::Receiver<Message>,
    /// Weak so that pending timers and fetches do not keep the task alive
    tx: mpsc::WeakSender<Message>,
}

impl Controller {
    pub fn new(
        session: Session,
        driver: Arc<dyn PlaybackDriver>,
        catalog: Arc<dyn CatalogProvider>,
        db: Pool<Sqlite>,
        events: Arc<EventBus>,
        playback: PlaybackConfig,
    ) -> (Self, ControllerHandle) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let controller = Self {
            session,
            driver,
            catalog,
            db,
            events,
            playback,
            rx,
            tx: tx.downgrade(),
        };
        (controller, ControllerHandle::new(tx))
    }

    /// Run on a new tokio task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process messages until every [`ControllerHandle`] is dropped
    pub async fn run(mut self) {
        info!("Controller started");
        while let Some(message) = self.rx.recv().await {
            self.process(message).await;
        }
        info!("Controller stopped");
    }

    async fn process(&mut self, message: Message) {
        match message {
            Message::Command { command, reply } => {
                let result = self.handle_command(command).await;
                if let Err(e) = &result {
                    warn!("Command failed: {}", e);
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result.map(|_| self.session.public_state()));
                }
            }
            Message::Driver(event) => self.handle_driver_event(event).await,
            Message::CatalogLoaded {
                generation,
                request,
                result,
            } => self.finish_load(generation, request, result).await,
        }
    }

    async fn handle_command(&mut self, command: Command) -> Result<()> {
        if command.is_query() {
            trace!("Command: {:?}", command);
        } else {
            info!("Command: {:?}", command);
        }

        match command {
            Command::GetState => {}
            Command::TogglePlayPause => self.toggle_play_pause().await,
            Command::Next => self.next().await,
            Command::Prev => self.prev().await,
            Command::SetVolume(volume) => self.set_volume(volume).await?,
            Command::ToggleShuffle => self.toggle_shuffle().await,
            Command::ToggleRepeat => self.toggle_repeat().await,
            Command::RefreshPlaylist => self.start_load(LoadRequest::Trending),
            Command::LoadArtist(input) => {
                let handle = normalize_handle(&input).ok_or_else(|| {
                    Error::BadRequest(format!("Not an artist handle: '{}'", input))
                })?;
                self.start_load(LoadRequest::Artist(handle));
            }
            Command::SwitchSource(source) => self.switch_source(source).await,
            Command::AddFavorite(id) => self.add_favorite(&id).await,
            Command::RemoveFavorite(id) => self.remove_favorite(&id).await,
            Command::PlaySongAtIndex(index) => match self.session.sequential_position(index) {
                Some(position) => self.play(position).await,
                None => debug!("No track at index {}, ignoring", index),
            },
        }

        Ok(())
    }

    async fn handle_driver_event(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::SongEnded => {
                debug!("Driver: song ended");
                self.next().await;
            }
            DriverEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                trace!("Driver: time {:.1}/{:.1}", current_time, duration);
                self.session.current_time = current_time;
                self.session.duration = duration;
                self.broadcast();
            }
            DriverEvent::PlaybackStarted => {
                debug!("Driver: playback started");
                self.session.is_playing = true;
                self.broadcast();
            }
            DriverEvent::PlaybackError { message } => {
                warn!("Driver reported playback error: {}", message);
                self.schedule_next(self.playback.error_retry_delay());
            }
        }
    }

    // ===== Transport =====

    async fn play(&mut self, index: usize) {
        let Some(track) = self.session.begin_play(index) else {
            return;
        };

        info!("Playing '{}' ({})", track.title, track.id);
        self.broadcast();

        if let Err(e) = self.driver.play(&track.audio_url).await {
            warn!("Play failed for {}: {}", track.id, e);
            self.schedule_next(self.playback.play_retry_delay());
        }
    }

    async fn next(&mut self) {
        match self.session.advance() {
            Advance::Play(index) => self.play(index).await,
            Advance::Stopped => {
                info!("Reached end of playlist");
                self.broadcast();
            }
            Advance::Idle => {}
        }
    }

    async fn prev(&mut self) {
        if let Some(index) = self
            .session
            .previous_index(self.playback.restart_threshold_secs)
        {
            self.play(index).await;
        }
    }

    async fn toggle_play_pause(&mut self) {
        if self.session.is_playing {
            match self.driver.pause().await {
                Ok(()) => self.session.is_playing = false,
                Err(e) => warn!("Pause failed: {}", e),
            }
        } else if self.session.current_song.is_some() {
            match self.driver.resume().await {
                Ok(()) => self.session.is_playing = true,
                Err(e) => warn!("Resume failed: {}", e),
            }
        } else if !self.session.playlist.is_empty() {
            self.play(0).await;
            return;
        }

        self.broadcast();
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !volume.is_finite() {
            return Err(Error::BadRequest(format!("Invalid volume: {}", volume)));
        }

        let volume = volume.clamp(0.0, 1.0);
        self.session.volume = volume;

        if let Err(e) = self.driver.set_volume(volume).await {
            warn!("Set volume failed: {}", e);
        }
        if let Err(e) = settings::set_volume(&self.db, volume).await {
            warn!("Failed to persist volume: {}", e);
        }

        self.broadcast();
        Ok(())
    }

    async fn toggle_shuffle(&mut self) {
        self.session.shuffle = !self.session.shuffle;
        if self.session.shuffle {
            self.session.regenerate_shuffle();
        }

        if let Err(e) = settings::set_shuffle(&self.db, self.session.shuffle).await {
            warn!("Failed to persist shuffle: {}", e);
        }
        self.broadcast();
    }

    async fn toggle_repeat(&mut self) {
        self.session.repeat = !self.session.repeat;

        if let Err(e) = settings::set_repeat(&self.db, self.session.repeat).await {
            warn!("Failed to persist repeat: {}", e);
        }
        self.broadcast();
    }

    // ===== Sources and favorites =====

    async fn switch_source(&mut self, source: Source) {
        match source {
            Source::Trending => self.start_load(LoadRequest::Trending),
            Source::Artist => match settings::get_last_artist_handle(&self.db).await {
                Ok(Some(handle)) => self.start_load(LoadRequest::Artist(handle)),
                Ok(None) => debug!("No artist loaded yet, ignoring switch to artist"),
                Err(e) => warn!("Failed to read last artist handle: {}", e),
            },
            Source::Favorites => {
                self.session.activate_favorites();
                if let Err(e) = settings::set_source(&self.db, Source::Favorites).await {
                    warn!("Failed to persist source: {}", e);
                }
                self.broadcast();
            }
        }
    }

    async fn add_favorite(&mut self, id: &str) {
        if !self.session.add_favorite(id) {
            debug!("Favorite {} unknown or already present", id);
            return;
        }

        self.persist_favorites().await;
        self.broadcast();
    }

    async fn remove_favorite(&mut self, id: &str) {
        if !self.session.remove_favorite(id) {
            debug!("Favorite {} not present", id);
            return;
        }

        self.persist_favorites().await;
        self.broadcast();
    }

    async fn persist_favorites(&self) {
        if let Err(e) = settings::set_favorites(&self.db, &self.session.favorites).await {
            warn!("Failed to persist favorites: {}", e);
        }
    }

    // ===== Loading =====

    fn start_load(&mut self, request: LoadRequest) {
        let generation = self
            .session
            .begin_load(request.source(), request.loading_message());
        self.broadcast();

        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        let catalog = Arc::clone(&self.catalog);

        tokio::spawn(async move {
            let result = match &request {
                LoadRequest::Trending => {
                    catalog.fetch_trending().await.map(|tracks| FetchedList {
                        tracks,
                        profile: None,
                    })
                }
                LoadRequest::Artist(handle) => {
                    catalog.fetch_artist(handle).await.map(|page| FetchedList {
                        tracks: page.tracks,
                        profile: Some(page.profile),
                    })
                }
            };

            let _ = tx
                .send(Message::CatalogLoaded {
                    generation,
                    request,
                    result,
                })
                .await;
        });
    }

    async fn finish_load(
        &mut self,
        generation: u64,
        request: LoadRequest,
        result: std::result::Result<FetchedList, CatalogError>,
    ) {
        if generation != self.session.load_generation {
            debug!(
                "Discarding stale {:?} load (generation {}, latest {})",
                request, generation, self.session.load_generation
            );
            return;
        }

        let source = request.source();
        match result {
            Ok(fetched) => {
                let tracks = ingest_tracks(fetched.tracks);
                if tracks.is_empty() {
                    warn!("{:?} returned no tracks, using cached list", request);
                    self.restore_cached(source).await;
                } else {
                    info!("Loaded {} tracks for {:?}", tracks.len(), request);
                    if fetched.profile.is_some() {
                        self.session.artist = fetched.profile.clone();
                    }
                    self.session.replace_playlist(tracks);

                    if let Err(e) = self.persist_loaded(source, fetched.profile.as_ref()).await {
                        warn!("Failed to persist loaded playlist: {}", e);
                    }
                }
            }
            Err(e) => {
                warn!("Failed to load {:?}: {}", request, e);
                self.restore_cached(source).await;
            }
        }

        self.session.loading = false;
        self.session.loading_message.clear();
        self.broadcast();
    }

    async fn persist_loaded(&self, source: Source, profile: Option<&ArtistProfile>) -> Result<()> {
        settings::set_cached_playlist(&self.db, source, &self.session.playlist).await?;
        settings::set_source(&self.db, source).await?;

        if let Some(profile) = profile {
            settings::set_artist_profile(&self.db, profile).await?;
            settings::set_last_artist_handle(&self.db, &profile.handle).await?;
        }
        Ok(())
    }

    /// Fall back to the last list fetched for `source`
    async fn restore_cached(&mut self, source: Source) {
        let cached = match settings::get_cached_playlist(&self.db, source).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Failed to read cached {} playlist: {}", source, e);
                return;
            }
        };

        if cached.is_empty() || cached == self.session.playlist {
            return;
        }

        if source == Source::Artist {
            match settings::get_artist_profile(&self.db).await {
                Ok(profile) => self.session.artist = profile,
                Err(e) => warn!("Failed to read cached artist profile: {}", e),
            }
        }

        info!("Restored {} cached {} tracks", cached.len(), source);
        self.session.replace_playlist(cached);
    }

    // ===== Helpers =====

    fn schedule_next(&self, delay: Duration) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx
                    .send(Message::Command {
                        command: Command::Next,
                        reply: None,
                    })
                    .await;
            }
        });
    }

    fn broadcast(&self) {
        self.events
            .emit_lossy(PlayerEvent::state_update(self.session.public_state()));
    }
}
