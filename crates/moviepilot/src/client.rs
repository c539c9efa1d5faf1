use reqwest::Client;
use serde_json::json;

use crate::error::MoviepilotError;
use crate::models::{DownloadTask, MediaInfo, SeasonInfo, SubscribeResponse, TokenResponse};

/// MoviePilot API client.
///
/// Every authenticated call fetches a fresh access token first; MoviePilot
/// tokens are short-lived and the bot's call rate is low.
pub struct MoviepilotClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl MoviepilotClient {
    /// Create a client against `base_url` (no trailing slash required).
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client,
            base_url,
            username: username.into(),
            password: password.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Obtain a bearer token via `/api/v1/login/access-token`.
    async fn access_token(&self) -> crate::Result<String> {
        if self.password.is_empty() {
            return Err(MoviepilotError::Auth("password is not configured".to_string()));
        }

        let response = self
            .client
            .post(self.url("/api/v1/login/access-token"))
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MoviepilotError::Auth(format!(
                "login failed ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let token: TokenResponse = response.json().await?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                MoviepilotError::Auth("no access token in login response".to_string())
            })
    }

    async fn get_authed(&self, path: &str) -> crate::Result<reqwest::Response> {
        let token = self.access_token().await?;
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> crate::Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MoviepilotError::Api {
                status_code: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Search media by title via `/api/v1/media/search`.
    pub async fn search_media(&self, title: &str) -> crate::Result<Vec<MediaInfo>> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.url("/api/v1/media/search"))
            .query(&[("title", title)])
            .bearer_auth(token)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// List all seasons of a series via `/api/v1/tmdb/seasons/{tmdb_id}`.
    pub async fn list_seasons(&self, tmdb_id: i64) -> crate::Result<Vec<SeasonInfo>> {
        let response = self
            .get_authed(&format!("/api/v1/tmdb/seasons/{}", tmdb_id))
            .await?;
        self.handle_response(response).await
    }

    /// Submit a movie subscription. Returns whether MoviePilot accepted it.
    pub async fn subscribe_movie(&self, media: &MediaInfo) -> crate::Result<bool> {
        self.submit_subscribe(json!({
            "name": media.title,
            "tmdbid": media.tmdb_id,
            "type": "电影",
        }))
        .await
    }

    /// Submit a subscription for one season of a series.
    pub async fn subscribe_series(&self, media: &MediaInfo, season: i32) -> crate::Result<bool> {
        self.submit_subscribe(json!({
            "name": media.title,
            "tmdbid": media.tmdb_id,
            "season": season,
        }))
        .await
    }

    async fn submit_subscribe(&self, body: serde_json::Value) -> crate::Result<bool> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(self.url("/api/v1/subscribe/"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let result: SubscribeResponse = self.handle_response(response).await?;
        if !result.success {
            tracing::debug!(
                "Subscribe rejected by MoviePilot: {}",
                result.message.as_deref().unwrap_or("no message")
            );
        }
        Ok(result.success)
    }

    /// List active download tasks via `/api/v1/download/`.
    pub async fn download_progress(&self) -> crate::Result<Vec<DownloadTask>> {
        let response = self.get_authed("/api/v1/download/").await?;
        self.handle_response(response).await
    }
}
