//! Settings database access
//!
//! Read/write persisted player fields from the settings table (key-value
//! store). Scalars are stored as their `to_string()` form, lists and profiles
//! as JSON.

use crate::error::{Error, Result};
use bgm_common::{ArtistProfile, Source, Track};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

const KEY_VOLUME: &str = "volume";
const KEY_SHUFFLE: &str = "shuffle";
const KEY_REPEAT: &str = "repeat";
const KEY_SOURCE: &str = "source";
const KEY_LAST_ARTIST_HANDLE: &str = "last_artist_handle";
const KEY_FAVORITES: &str = "favorites";
const KEY_ARTIST_PROFILE: &str = "artist_profile";

/// Default volume (0.0-1.0)
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Everything restored at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSettings {
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: bool,
    pub source: Source,
    pub last_artist_handle: Option<String>,
    pub favorites: Vec<Track>,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            shuffle: true,
            repeat: true,
            source: Source::Trending,
            last_artist_handle: None,
            favorites: Vec::new(),
        }
    }
}

/// Load all persisted fields, falling back to defaults for missing keys
pub async fn load_persisted(db: &Pool<Sqlite>) -> Result<PersistedSettings> {
    let defaults = PersistedSettings::default();

    Ok(PersistedSettings {
        volume: get_volume(db).await?,
        shuffle: get_setting(db, KEY_SHUFFLE).await?.unwrap_or(defaults.shuffle),
        repeat: get_setting(db, KEY_REPEAT).await?.unwrap_or(defaults.repeat),
        source: get_source(db).await?,
        last_artist_handle: get_last_artist_handle(db).await?,
        favorites: get_favorites(db).await?,
    })
}

/// Get volume setting (0.0-1.0)
pub async fn get_volume(db: &Pool<Sqlite>) -> Result<f32> {
    Ok(get_setting::<f32>(db, KEY_VOLUME)
        .await?
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_VOLUME))
}

/// Set volume setting (0.0-1.0)
pub async fn set_volume(db: &Pool<Sqlite>, volume: f32) -> Result<()> {
    set_setting(db, KEY_VOLUME, volume.clamp(0.0, 1.0)).await
}

pub async fn set_shuffle(db: &Pool<Sqlite>, shuffle: bool) -> Result<()> {
    set_setting(db, KEY_SHUFFLE, shuffle).await
}

pub async fn set_repeat(db: &Pool<Sqlite>, repeat: bool) -> Result<()> {
    set_setting(db, KEY_REPEAT, repeat).await
}

/// Get the last active source (trending if never set)
pub async fn get_source(db: &Pool<Sqlite>) -> Result<Source> {
    Ok(get_setting::<Source>(db, KEY_SOURCE).await?.unwrap_or_default())
}

pub async fn set_source(db: &Pool<Sqlite>, source: Source) -> Result<()> {
    set_setting(db, KEY_SOURCE, source).await
}

pub async fn get_last_artist_handle(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, KEY_LAST_ARTIST_HANDLE).await
}

pub async fn set_last_artist_handle(db: &Pool<Sqlite>, handle: &str) -> Result<()> {
    set_setting(db, KEY_LAST_ARTIST_HANDLE, handle).await
}

pub async fn get_favorites(db: &Pool<Sqlite>) -> Result<Vec<Track>> {
    Ok(get_json(db, KEY_FAVORITES).await?.unwrap_or_default())
}

pub async fn set_favorites(db: &Pool<Sqlite>, favorites: &[Track]) -> Result<()> {
    set_json(db, KEY_FAVORITES, &favorites).await
}

/// Last successfully fetched list for a source
///
/// Used as the fallback when fetching that source fails.
pub async fn get_cached_playlist(db: &Pool<Sqlite>, source: Source) -> Result<Vec<Track>> {
    Ok(get_json(db, &playlist_key(source)).await?.unwrap_or_default())
}

pub async fn set_cached_playlist(db: &Pool<Sqlite>, source: Source, tracks: &[Track]) -> Result<()> {
    set_json(db, &playlist_key(source), &tracks).await
}

pub async fn get_artist_profile(db: &Pool<Sqlite>) -> Result<Option<ArtistProfile>> {
    get_json(db, KEY_ARTIST_PROFILE).await
}

pub async fn set_artist_profile(db: &Pool<Sqlite>, profile: &ArtistProfile) -> Result<()> {
    set_json(db, KEY_ARTIST_PROFILE, profile).await
}

fn playlist_key(source: Source) -> String {
    format!("playlist_{}", source)
}

/// Generic setting getter
///
/// Returns None if key doesn't exist in database.
/// Parses value from string using FromStr trait.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}

async fn get_json<T: DeserializeOwned>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    value
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(Error::from)
}

async fn set_json<T: Serialize + ?Sized>(db: &Pool<Sqlite>, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    set_setting(db, key, json).await
}
