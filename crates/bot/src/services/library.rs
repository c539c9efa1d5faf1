use std::sync::Arc;

use async_trait::async_trait;
use emby::{EmbyClient, ItemKind, LibraryItem, LibraryStats, TodayAdditions};

/// Media library seam consumed by the query handlers and the report path.
///
/// `None` means the query failed; callers surface a generic failure message
/// instead of an error.
#[async_trait]
pub trait LibraryClient: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn latest(&self, kind: Option<ItemKind>) -> Option<Vec<LibraryItem>>;
    async fn search(&self, keyword: &str) -> Option<Vec<LibraryItem>>;
    async fn stats(&self) -> Option<LibraryStats>;
    async fn today_additions(&self) -> Option<TodayAdditions>;
}

/// `LibraryClient` over the Emby API.
pub struct EmbyLibrary {
    client: Arc<EmbyClient>,
}

impl EmbyLibrary {
    pub fn new(client: Arc<EmbyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LibraryClient for EmbyLibrary {
    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn latest(&self, kind: Option<ItemKind>) -> Option<Vec<LibraryItem>> {
        match self.client.latest_items(kind).await {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::error!("Emby latest-items query failed: {}", e);
                None
            }
        }
    }

    async fn search(&self, keyword: &str) -> Option<Vec<LibraryItem>> {
        match self.client.search_items(keyword).await {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::error!("Emby search for '{}' failed: {}", keyword, e);
                None
            }
        }
    }

    async fn stats(&self) -> Option<LibraryStats> {
        match self.client.library_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::error!("Emby stats query failed: {}", e);
                None
            }
        }
    }

    async fn today_additions(&self) -> Option<TodayAdditions> {
        match self.client.today_additions().await {
            Ok(additions) => Some(additions),
            Err(e) => {
                tracing::error!("Emby today-additions query failed: {}", e);
                None
            }
        }
    }
}
