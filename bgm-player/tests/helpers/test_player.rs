//! Controller wired to mocks, an in-memory database and the real router

use axum::Router;
use bgm_common::events::{EventBus, PlayerEvent, PublicState};
use bgm_common::Track;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use bgm_player::api::{create_router, AppContext};
use bgm_player::config::PlaybackConfig;
use bgm_player::controller::{Controller, ControllerHandle, Session};
use bgm_player::db;
use bgm_player::driver::RemoteDriver;

use super::mocks::{MockCatalog, MockDriver};

pub struct TestPlayer {
    pub handle: ControllerHandle,
    pub events: Arc<EventBus>,
    pub driver: Arc<MockDriver>,
    pub catalog: Arc<MockCatalog>,
    pub remote: Arc<RemoteDriver>,
    pub db: Pool<Sqlite>,
}

impl TestPlayer {
    /// Start with an empty playlist and shuffle off
    pub async fn start() -> Self {
        Self::start_with(Session {
            shuffle: false,
            ..Session::default()
        })
        .await
    }

    /// Start with `tracks` already loaded (shuffle off, repeat as given)
    pub async fn with_playlist(tracks: Vec<Track>, repeat: bool) -> Self {
        let mut session = Session {
            shuffle: false,
            repeat,
            ..Session::default()
        };
        session.replace_playlist(tracks);
        Self::start_with(session).await
    }

    pub async fn start_with(session: Session) -> Self {
        Self::start_with_catalog(session, MockCatalog::default()).await
    }

    pub async fn start_with_catalog(session: Session, catalog: MockCatalog) -> Self {
        let db = db::connect_in_memory()
            .await
            .expect("Failed to create test database");
        let events = Arc::new(EventBus::new(256));
        let driver = Arc::new(MockDriver::default());
        let catalog = Arc::new(catalog);

        let playback = PlaybackConfig {
            play_retry_delay_ms: 40,
            error_retry_delay_ms: 20,
            restart_threshold_secs: 3.0,
        };

        let (controller, handle) = Controller::new(
            session,
            driver.clone(),
            catalog.clone(),
            db.clone(),
            Arc::clone(&events),
            playback,
        );
        controller.spawn();

        Self {
            handle,
            events,
            driver,
            catalog,
            remote: Arc::new(RemoteDriver::new(8, Duration::from_millis(200))),
            db,
        }
    }

    pub fn router(&self) -> Router {
        create_router(AppContext {
            controller: self.handle.clone(),
            events: Arc::clone(&self.events),
            driver: Arc::clone(&self.remote),
            port: 5750,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}

/// Wait for the first broadcast state matching `predicate`
pub async fn wait_for_state<F>(rx: &mut broadcast::Receiver<PlayerEvent>, predicate: F) -> PublicState
where
    F: Fn(&PublicState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(PlayerEvent::StateUpdate { state, .. }) if predicate(&state) => return state,
                Ok(_) => continue,
                Err(e) => panic!("State stream failed: {}", e),
            }
        }
    })
    .await
    .expect("Timed out waiting for state")
}
