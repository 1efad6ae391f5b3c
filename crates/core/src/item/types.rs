//! Tracked item data types.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Tags
// ============================================================================

/// Status bucket a tracked item sits in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
    Rewatching,
}

impl WatchStatus {
    /// All statuses, in display order.
    pub const ALL: [WatchStatus; 6] = [
        WatchStatus::Watching,
        WatchStatus::Completed,
        WatchStatus::OnHold,
        WatchStatus::Dropped,
        WatchStatus::PlanToWatch,
        WatchStatus::Rewatching,
    ];

    /// Returns the wire tag for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::OnHold => "on_hold",
            WatchStatus::Dropped => "dropped",
            WatchStatus::PlanToWatch => "plan_to_watch",
            WatchStatus::Rewatching => "rewatching",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Anime,
    Manga,
    Movie,
    Tv,
    Book,
    Game,
    Other,
}

impl MediaType {
    pub const ALL: [MediaType; 7] = [
        MediaType::Anime,
        MediaType::Manga,
        MediaType::Movie,
        MediaType::Tv,
        MediaType::Book,
        MediaType::Game,
        MediaType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Anime => "anime",
            MediaType::Manga => "manga",
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
            MediaType::Book => "book",
            MediaType::Game => "game",
            MediaType::Other => "other",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|media_type| media_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown media type: {}", s))
    }
}

// ============================================================================
// Validated records
// ============================================================================

/// Catalog entry embedded in a tracked item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_titles: Vec<String>,
    pub media_type: MediaType,
    /// Episode count (video media).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    /// Chapter count (print media).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<u32>,
    /// Global community score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
}

impl CatalogItem {
    /// Total units of progress (episodes or chapters), when known.
    pub fn total_units(&self) -> Option<u32> {
        self.episodes.or(self.chapters).filter(|total| *total > 0)
    }
}

/// One user-to-catalog association shown in list views.
///
/// Only ever constructed from a [`RawTrackedItem`] that passed sanitization,
/// or directly by trusted code (tests, fixtures).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub id: String,
    pub status: WatchStatus,
    /// User rating on a 0-10 scale. `None` = unrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_started: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewatch_count: Option<u32>,
    /// Episodes watched / chapters read.
    #[serde(default)]
    pub progress: u32,
    pub catalog: CatalogItem,
}

// ============================================================================
// Wire records
// ============================================================================

/// Catalog reference as it arrives from the list-fetch collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCatalogItem {
    pub id: Option<String>,
    pub title: Option<String>,
    pub alternate_titles: Vec<String>,
    pub media_type: Option<String>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub score: Option<f64>,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
}

/// Tracked item as it arrives from the list-fetch collaborator.
///
/// Every field is optional so that one malformed record never fails the
/// whole response; see [`crate::item::sanitize_records`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTrackedItem {
    pub id: Option<String>,
    pub status: Option<String>,
    pub rating: Option<f64>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub added_at: Option<DateTime<Utc>>,
    pub date_started: Option<NaiveDate>,
    pub date_completed: Option<NaiveDate>,
    pub rewatch_count: Option<u32>,
    pub progress: Option<u32>,
    pub catalog: Option<RawCatalogItem>,
}

impl From<&TrackedItem> for RawTrackedItem {
    fn from(item: &TrackedItem) -> Self {
        Self {
            id: Some(item.id.clone()),
            status: Some(item.status.as_str().to_string()),
            rating: item.rating,
            notes: item.notes.clone(),
            tags: item.tags.iter().cloned().collect(),
            added_at: item.added_at,
            date_started: item.date_started,
            date_completed: item.date_completed,
            rewatch_count: item.rewatch_count,
            progress: Some(item.progress),
            catalog: Some(RawCatalogItem {
                id: Some(item.catalog.id.clone()),
                title: Some(item.catalog.title.clone()),
                alternate_titles: item.catalog.alternate_titles.clone(),
                media_type: Some(item.catalog.media_type.as_str().to_string()),
                episodes: item.catalog.episodes,
                chapters: item.catalog.chapters,
                score: item.catalog.score,
                genres: item.catalog.genres.clone(),
                themes: item.catalog.themes.clone(),
            }),
        }
    }
}

// ============================================================================
// Mutations
// ============================================================================

/// Partial update sent to the mutation collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_tags: Option<Vec<String>>,
}

impl ItemUpdate {
    pub fn status(status: WatchStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn add_tag(tag: impl Into<String>) -> Self {
        Self {
            add_tags: Some(vec![tag.into()]),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in WatchStatus::ALL {
            assert_eq!(status.as_str().parse::<WatchStatus>().unwrap(), status);
        }
        assert!("paused".parse::<WatchStatus>().is_err());
    }

    #[test]
    fn test_status_parse_is_lenient_on_case_and_whitespace() {
        assert_eq!(
            " Plan_To_Watch ".parse::<WatchStatus>().unwrap(),
            WatchStatus::PlanToWatch
        );
    }

    #[test]
    fn test_total_units_prefers_episodes() {
        let catalog = CatalogItem {
            id: "c1".to_string(),
            title: "Show".to_string(),
            alternate_titles: vec![],
            media_type: MediaType::Anime,
            episodes: Some(12),
            chapters: Some(100),
            score: None,
            genres: vec![],
            themes: vec![],
        };
        assert_eq!(catalog.total_units(), Some(12));
    }

    #[test]
    fn test_total_units_ignores_zero() {
        let catalog = CatalogItem {
            id: "c1".to_string(),
            title: "Ongoing".to_string(),
            alternate_titles: vec![],
            media_type: MediaType::Manga,
            episodes: None,
            chapters: Some(0),
            score: None,
            genres: vec![],
            themes: vec![],
        };
        assert_eq!(catalog.total_units(), None);
    }

    #[test]
    fn test_raw_item_tolerates_missing_fields() {
        let raw: RawTrackedItem = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(raw.id.as_deref(), Some("x"));
        assert!(raw.catalog.is_none());
        assert!(raw.tags.is_empty());
    }

    #[test]
    fn test_item_update_skips_unset_fields() {
        let json = serde_json::to_value(ItemUpdate::status(WatchStatus::Dropped)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "dropped" }));
    }
}
