//! MoviePilot API client library.
//!
//! Covers the endpoints the bot needs: login, media search, season listing,
//! subscription submission and download progress.

mod client;
mod error;
pub mod models;

pub use client::MoviepilotClient;
pub use error::MoviepilotError;
pub use models::{DownloadTask, MediaInfo, MediaKind, SeasonInfo};

pub type Result<T> = std::result::Result<T, MoviepilotError>;
