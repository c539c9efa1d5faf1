//! Emby server API client library.
//!
//! Read-only queries against a media server: latest additions, library
//! search, item counts and the "added today" window used by the daily digest.

mod client;
mod error;
pub mod models;

pub use client::EmbyClient;
pub use error::EmbyError;
pub use models::{ItemKind, LibraryItem, LibraryStats, TodayAdditions};

pub type Result<T> = std::result::Result<T, EmbyError>;
