use std::sync::Arc;

use async_trait::async_trait;
use moviepilot::{MediaInfo, MoviepilotClient, SeasonInfo};

/// Media catalog seam consumed by selection sessions.
///
/// Absence of a positive result means "failed": implementations absorb
/// transport errors and return empty/false, they never bubble them up into
/// a session turn.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search_title(&self, title: &str) -> Vec<MediaInfo>;
    async fn list_seasons(&self, tmdb_id: i64) -> Vec<SeasonInfo>;
    async fn subscribe_movie(&self, media: &MediaInfo) -> bool;
    async fn subscribe_series(&self, media: &MediaInfo, season: i32) -> bool;
}

/// `CatalogClient` over the MoviePilot API.
pub struct MoviepilotCatalog {
    client: Arc<MoviepilotClient>,
}

impl MoviepilotCatalog {
    pub fn new(client: Arc<MoviepilotClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogClient for MoviepilotCatalog {
    async fn search_title(&self, title: &str) -> Vec<MediaInfo> {
        match self.client.search_media(title).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Media search for '{}' failed: {}", title, e);
                Vec::new()
            }
        }
    }

    async fn list_seasons(&self, tmdb_id: i64) -> Vec<SeasonInfo> {
        match self.client.list_seasons(tmdb_id).await {
            Ok(seasons) => seasons,
            Err(e) => {
                tracing::error!("Season listing for tmdb {} failed: {}", tmdb_id, e);
                Vec::new()
            }
        }
    }

    async fn subscribe_movie(&self, media: &MediaInfo) -> bool {
        match self.client.subscribe_movie(media).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Movie subscribe for '{}' failed: {}", media.title, e);
                false
            }
        }
    }

    async fn subscribe_series(&self, media: &MediaInfo, season: i32) -> bool {
        match self.client.subscribe_series(media, season).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!(
                    "Series subscribe for '{}' S{} failed: {}",
                    media.title,
                    season,
                    e
                );
                false
            }
        }
    }
}
