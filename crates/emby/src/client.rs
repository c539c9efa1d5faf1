use reqwest::Client;

use crate::error::EmbyError;
use crate::models::{
    CountsResponse, ItemKind, ItemsResponse, LibraryItem, LibraryStats, TodayAdditions,
};

/// Emby server API client.
pub struct EmbyClient {
    client: Client,
    base_url: String,
    api_key: String,
    /// Scope item queries to this user's views when set.
    user_id: Option<String>,
    max_results: usize,
}

impl EmbyClient {
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        user_id: Option<String>,
        max_results: usize,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client,
            base_url,
            api_key: api_key.into(),
            user_id: user_id.filter(|u| !u.is_empty()),
            max_results,
        }
    }

    /// Whether both a server URL and an API key are configured.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    /// Items endpoint, user-scoped when a user id is configured.
    fn items_url(&self) -> String {
        match &self.user_id {
            Some(user_id) => format!("{}/Users/{}/Items", self.base_url, user_id),
            None => format!("{}/Items", self.base_url),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> crate::Result<T> {
        if !self.is_configured() {
            return Err(EmbyError::NotConfigured);
        }

        let response = self
            .client
            .get(url)
            .header("X-Emby-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Emby API returned {} for {}: {}", status.as_u16(), url, message);
            return Err(EmbyError::Api {
                status_code: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Latest additions, newest first. `kind` limits the item types;
    /// `None` returns both movies and series.
    pub async fn latest_items(&self, kind: Option<ItemKind>) -> crate::Result<Vec<LibraryItem>> {
        let include = match kind {
            Some(ItemKind::Movie) => "Movie",
            Some(ItemKind::Series) => "Series",
            _ => "Movie,Series",
        };
        let response: ItemsResponse = self
            .get(
                &self.items_url(),
                &[
                    ("SortBy", "DateCreated".to_string()),
                    ("SortOrder", "Descending".to_string()),
                    ("IncludeItemTypes", include.to_string()),
                    ("Recursive", "true".to_string()),
                    ("Limit", self.max_results.to_string()),
                ],
            )
            .await?;
        Ok(response.items.into_iter().map(|i| i.into_item()).collect())
    }

    /// Full-text search over movies and series.
    pub async fn search_items(&self, keyword: &str) -> crate::Result<Vec<LibraryItem>> {
        let response: ItemsResponse = self
            .get(
                &self.items_url(),
                &[
                    ("SearchTerm", keyword.to_string()),
                    ("IncludeItemTypes", "Movie,Series".to_string()),
                    ("Recursive", "true".to_string()),
                    ("Limit", self.max_results.to_string()),
                ],
            )
            .await?;
        Ok(response.items.into_iter().map(|i| i.into_item()).collect())
    }

    /// Library-wide item counts from `/Items/Counts`.
    pub async fn library_stats(&self) -> crate::Result<LibraryStats> {
        let url = format!("{}/Items/Counts", self.base_url);
        let counts: CountsResponse = self.get(&url, &[]).await?;
        Ok(LibraryStats {
            movies: counts.movie_count,
            series: counts.series_count,
            episodes: counts.episode_count,
        })
    }

    /// Everything added since local midnight, with per-kind counts.
    pub async fn today_additions(&self) -> crate::Result<TodayAdditions> {
        let start_of_day = chrono::Local::now()
            .format("%Y-%m-%dT00:00:00Z")
            .to_string();
        let response: ItemsResponse = self
            .get(
                &self.items_url(),
                &[
                    ("Recursive", "true".to_string()),
                    ("IncludeItemTypes", "Movie,Series,Episode".to_string()),
                    ("MinDateCreated", start_of_day),
                    ("SortBy", "DateCreated".to_string()),
                    ("SortOrder", "Descending".to_string()),
                ],
            )
            .await?;

        let mut additions = TodayAdditions::default();
        for item in response.items {
            match item.kind {
                ItemKind::Movie => additions.movies += 1,
                ItemKind::Series => additions.series += 1,
                ItemKind::Episode => additions.episodes += 1,
                ItemKind::Other => {}
            }
            additions.items.push(item.into_item());
        }
        Ok(additions)
    }
}
