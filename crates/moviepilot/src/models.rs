use serde::{Deserialize, Serialize};

/// Media kind as reported by MoviePilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "电影")]
    Movie,
    #[serde(rename = "电视剧")]
    Series,
}

impl MediaKind {
    pub fn to_chinese(&self) -> &'static str {
        match self {
            MediaKind::Movie => "电影",
            MediaKind::Series => "电视剧",
        }
    }
}

/// One search result from `/api/v1/media/search`.
///
/// Identity is `(tmdb_id, kind)`; the struct is never mutated after it is
/// returned by a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    pub tmdb_id: i64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl MediaInfo {
    /// Display line used in numbered candidate lists, e.g. `"沙丘 (2021)"`.
    pub fn display_title(&self) -> String {
        match &self.year {
            Some(year) if !year.is_empty() => format!("{} ({})", self.title, year),
            _ => self.title.clone(),
        }
    }
}

/// One season entry from `/api/v1/tmdb/seasons/{tmdb_id}`.
///
/// `season_number` 0 denotes specials/extras.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonInfo {
    pub season_number: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub episode_count: Option<i32>,
}

/// Subscription submission result.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Media summary attached to a download task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadMedia {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
}

/// One entry from `/api/v1/download/`.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadTask {
    #[serde(default)]
    pub media: Option<DownloadMedia>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub state: Option<String>,
}

impl DownloadTask {
    /// Progress line in the `标题 季 集：进度%` format.
    pub fn progress_line(&self) -> String {
        let media = self.media.clone().unwrap_or_default();
        let title = media
            .title
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "未知".to_string());
        let season = media.season.unwrap_or_default();
        let episode = media.episode.unwrap_or_default();
        format!(
            "{} {} {}：{:.2}%",
            title,
            season,
            episode,
            self.progress
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}
