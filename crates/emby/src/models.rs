use serde::Deserialize;

/// Emby item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ItemKind {
    Movie,
    Series,
    Episode,
    #[serde(other)]
    Other,
}

impl ItemKind {
    pub fn to_chinese(&self) -> &'static str {
        match self {
            ItemKind::Movie => "电影",
            ItemKind::Series => "电视剧",
            ItemKind::Episode => "单集",
            ItemKind::Other => "其他",
        }
    }
}

/// One library item, flattened from the Emby wire shape.
#[derive(Debug, Clone)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    pub kind: ItemKind,
    /// Formatted as `YYYY-MM-DD HH:MM`.
    pub date_created: Option<String>,
    /// Parent series name, present on episodes.
    pub series_name: Option<String>,
    /// Season number, present on episodes.
    pub season_number: Option<i32>,
    /// Episode number within the season, present on episodes.
    pub episode_number: Option<i32>,
}

/// Library-wide item counts from `/Items/Counts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryStats {
    pub movies: i64,
    pub series: i64,
    pub episodes: i64,
}

/// Items added since local midnight, with per-kind counts.
#[derive(Debug, Clone, Default)]
pub struct TodayAdditions {
    pub movies: usize,
    pub series: usize,
    pub episodes: usize,
    pub items: Vec<LibraryItem>,
}

impl TodayAdditions {
    pub fn total(&self) -> usize {
        self.movies + self.series + self.episodes
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<EmbyItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct EmbyItem {
    #[serde(default)]
    pub id: String,
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub production_year: Option<i32>,
    #[serde(rename = "Type", default = "default_kind")]
    pub kind: ItemKind,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub parent_index_number: Option<i32>,
    #[serde(default)]
    pub index_number: Option<i32>,
}

fn unknown_name() -> String {
    "未知".to_string()
}

fn default_kind() -> ItemKind {
    ItemKind::Other
}

impl EmbyItem {
    pub(crate) fn into_item(self) -> LibraryItem {
        LibraryItem {
            id: self.id,
            name: self.name,
            original_title: self.original_title.filter(|t| !t.is_empty()),
            year: self.production_year,
            kind: self.kind,
            date_created: self.date_created.as_deref().map(format_date),
            series_name: self.series_name.filter(|s| !s.is_empty()),
            season_number: self.parent_index_number,
            episode_number: self.index_number,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CountsResponse {
    #[serde(default)]
    pub movie_count: i64,
    #[serde(default)]
    pub series_count: i64,
    #[serde(default)]
    pub episode_count: i64,
}

/// Format an Emby timestamp (`2024-01-15T10:30:00.0000000Z`) as
/// `2024-01-15 10:30`. Falls back to a raw prefix when unparsable.
pub(crate) fn format_date(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.chars().take(16).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_episode_item() {
        let json = r#"{
            "Id": "42",
            "Name": "第五集",
            "Type": "Episode",
            "SeriesName": "庆余年",
            "ParentIndexNumber": 2,
            "IndexNumber": 5,
            "DateCreated": "2024-01-15T10:30:00.0000000Z"
        }"#;
        let item: EmbyItem = serde_json::from_str(json).unwrap();
        let item = item.into_item();
        assert_eq!(item.kind, ItemKind::Episode);
        assert_eq!(item.series_name.as_deref(), Some("庆余年"));
        assert_eq!(item.season_number, Some(2));
        assert_eq!(item.episode_number, Some(5));
        assert_eq!(item.date_created.as_deref(), Some("2024-01-15 10:30"));
    }

    #[test]
    fn unknown_kind_maps_to_other() {
        let json = r#"{"Id": "1", "Name": "x", "Type": "BoxSet"}"#;
        let item: EmbyItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ItemKind::Other);
    }

    #[test]
    fn format_date_falls_back_on_garbage() {
        assert_eq!(format_date("not-a-date"), "not-a-date");
    }
}
