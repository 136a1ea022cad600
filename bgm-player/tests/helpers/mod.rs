//! Test helper modules for bgm-player integration tests
//!
//! - MockDriver: records driver commands, failures switchable per command
//! - MockCatalog: scripted catalog responses with optional latency
//! - TestPlayer: controller + router over an in-memory database

#![allow(dead_code)]

pub mod mocks;
pub mod test_player;

pub use mocks::{track, tracks, MockCatalog, MockDriver};
pub use test_player::{wait_for_state, TestPlayer};
