//! # BGM Player Library (bgm-player)
//!
//! Background music controller: keeps the active playlist, navigates it with
//! shuffle/repeat/favorites semantics, drives a remote playback driver and
//! broadcasts its state to UI listeners.
//!
//! **Architecture:** one controller task fed by a message queue; HTTP/SSE
//! control surface on axum; settings in SQLite.

pub mod api;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod db;
pub mod driver;
pub mod error;

pub use error::{Error, Result};
