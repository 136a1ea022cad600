//! HTTP API for bgm-player
//!
//! UI-facing routes live under `/api` and `/events`; the playback driver
//! connects through `/driver`.

pub mod driver;
pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, AppContext};
