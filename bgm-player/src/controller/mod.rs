//! Playlist/playback controller
//!
//! A single task owns the session. Everything that can change it (UI
//! commands, driver events, finished catalog fetches) is queued and applied
//! one message at a time.

pub mod commands;
pub mod engine;
pub mod handle;
pub mod session;

pub use commands::{Command, LoadRequest};
pub use engine::Controller;
pub use handle::ControllerHandle;
pub use session::Session;

use bgm_common::Source;

use crate::db::settings::PersistedSettings;

/// First command after startup: reopen whatever source was active last
pub fn initial_command(settings: &PersistedSettings) -> Command {
    match (settings.source, &settings.last_artist_handle) {
        (Source::Artist, Some(handle)) => Command::LoadArtist(handle.clone()),
        (Source::Favorites, _) => Command::SwitchSource(Source::Favorites),
        _ => Command::RefreshPlaylist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_command() {
        let mut settings = PersistedSettings::default();
        assert_eq!(initial_command(&settings), Command::RefreshPlaylist);

        settings.source = Source::Artist;
        assert_eq!(initial_command(&settings), Command::RefreshPlaylist);

        settings.last_artist_handle = Some("dj".to_string());
        assert_eq!(initial_command(&settings), Command::LoadArtist("dj".to_string()));

        settings.source = Source::Favorites;
        assert_eq!(
            initial_command(&settings),
            Command::SwitchSource(Source::Favorites)
        );
    }
}
