//! Declarative filter specification.
//!
//! A [`FilterSpecification`] is an immutable value: every edit goes through a
//! `with_*` method that returns a new specification. This keeps preset
//! detection a plain equality check and lets callers hold on to old values
//! (undo, "did this change?") for free.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::item::{MediaType, WatchStatus};

/// Lowest rating on the user scale.
pub const RATING_MIN: f64 = 0.0;
/// Highest rating on the user scale.
pub const RATING_MAX: f64 = 10.0;

// ============================================================================
// Dimensions
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusOperator {
    #[default]
    Includes,
    Excludes,
}

/// Status dimension. Empty `values` matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusFilter {
    #[serde(default)]
    pub values: BTreeSet<WatchStatus>,
    #[serde(default)]
    pub operator: StatusOperator,
}

impl StatusFilter {
    pub fn includes(values: impl IntoIterator<Item = WatchStatus>) -> Self {
        Self {
            values: values.into_iter().collect(),
            operator: StatusOperator::Includes,
        }
    }

    pub fn excludes(values: impl IntoIterator<Item = WatchStatus>) -> Self {
        Self {
            values: values.into_iter().collect(),
            operator: StatusOperator::Excludes,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rating dimension.
///
/// `include_unrated` only decides the fate of items without a rating; rated
/// items are always checked against `min..=max`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingFilter {
    #[serde(default = "default_rating_min")]
    pub min: f64,
    #[serde(default = "default_rating_max")]
    pub max: f64,
    #[serde(default = "default_true")]
    pub include_unrated: bool,
}

fn default_rating_min() -> f64 {
    RATING_MIN
}

fn default_rating_max() -> f64 {
    RATING_MAX
}

fn default_true() -> bool {
    true
}

impl Default for RatingFilter {
    fn default() -> Self {
        Self {
            min: RATING_MIN,
            max: RATING_MAX,
            include_unrated: true,
        }
    }
}

impl RatingFilter {
    /// Rated items within `min..=max`; unrated items still pass.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            include_unrated: true,
        }
    }

    pub fn excluding_unrated(mut self) -> Self {
        self.include_unrated = false;
        self
    }

    /// Whether this filter lets every item through.
    ///
    /// A full `0..=10` range that also admits unrated items is "no rating
    /// filter". The same range with unrated items excluded still hides
    /// something, so it counts as a restriction.
    pub fn is_unrestricted(&self) -> bool {
        self.min <= RATING_MIN && self.max >= RATING_MAX && self.include_unrated
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TagOperator {
    #[default]
    Any,
    All,
    None,
}

/// Tag dimension. Empty `values` matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagFilter {
    #[serde(default)]
    pub values: BTreeSet<String>,
    #[serde(default)]
    pub operator: TagOperator,
}

impl TagFilter {
    pub fn new<I, S>(operator: TagOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            operator,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.values.is_empty()
    }
}

/// Which item date a [`DateRangeFilter`] looks at.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DateField {
    #[default]
    AddedAt,
    DateStarted,
    DateCompleted,
}

/// Inclusive date range. Either bound may be open.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRangeFilter {
    #[serde(default)]
    pub field: DateField,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRangeFilter {
    pub fn between(field: DateField, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { field, start, end }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Media type dimension. Empty `values` matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaTypeFilter {
    #[serde(default)]
    pub values: BTreeSet<MediaType>,
}

impl MediaTypeFilter {
    pub fn of(values: impl IntoIterator<Item = MediaType>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.values.is_empty()
    }
}

/// Inclusive rewatch counter range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewatchFilter {
    #[serde(default)]
    pub min: u32,
    #[serde(default = "default_rewatch_max")]
    pub max: u32,
}

fn default_rewatch_max() -> u32 {
    u32::MAX
}

impl Default for RewatchFilter {
    fn default() -> Self {
        Self {
            min: 0,
            max: u32::MAX,
        }
    }
}

impl RewatchFilter {
    pub fn at_least(min: u32) -> Self {
        Self {
            min,
            ..Default::default()
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.min == 0 && self.max == u32::MAX
    }
}

// ============================================================================
// Specification
// ============================================================================

/// The full "which items to show" description.
///
/// Dimensions are combined with logical AND. The default value matches every
/// item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpecification {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub rating: RatingFilter,
    #[serde(default)]
    pub tags: TagFilter,
    #[serde(default)]
    pub date_range: DateRangeFilter,
    #[serde(default)]
    pub media_type: MediaTypeFilter,
    #[serde(default)]
    pub rewatch_count: RewatchFilter,
    #[serde(default)]
    pub search: String,
}

impl FilterSpecification {
    pub fn with_status(&self, status: StatusFilter) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn with_rating(&self, rating: RatingFilter) -> Self {
        Self {
            rating,
            ..self.clone()
        }
    }

    pub fn with_tags(&self, tags: TagFilter) -> Self {
        Self {
            tags,
            ..self.clone()
        }
    }

    pub fn with_date_range(&self, date_range: DateRangeFilter) -> Self {
        Self {
            date_range,
            ..self.clone()
        }
    }

    pub fn with_media_type(&self, media_type: MediaTypeFilter) -> Self {
        Self {
            media_type,
            ..self.clone()
        }
    }

    pub fn with_rewatch_count(&self, rewatch_count: RewatchFilter) -> Self {
        Self {
            rewatch_count,
            ..self.clone()
        }
    }

    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self.clone()
        }
    }

    /// Search text as the evaluator sees it.
    pub fn search_term(&self) -> &str {
        self.search.trim()
    }

    /// Number of dimensions that currently restrict the result set.
    ///
    /// Drives the "N filters active" indicator.
    pub fn active_filter_count(&self) -> usize {
        [
            !self.status.is_unrestricted(),
            !self.rating.is_unrestricted(),
            !self.tags.is_unrestricted(),
            !self.date_range.is_unrestricted(),
            !self.media_type.is_unrestricted(),
            !self.rewatch_count.is_unrestricted(),
            !self.search_term().is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// True when no dimension deviates from "match all".
    pub fn is_default(&self) -> bool {
        self.active_filter_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unrestricted() {
        let spec = FilterSpecification::default();
        assert!(spec.is_default());
        assert_eq!(spec.active_filter_count(), 0);
    }

    #[test]
    fn test_with_methods_do_not_mutate_original() {
        let base = FilterSpecification::default();
        let edited = base.with_search("frieren");
        assert_eq!(base.search, "");
        assert_eq!(edited.search, "frieren");
        assert_ne!(base, edited);
    }

    #[test]
    fn test_whitespace_search_is_not_active() {
        let spec = FilterSpecification::default().with_search("   ");
        assert!(spec.is_default());
    }

    #[test]
    fn test_full_rating_range_counts_as_unfiltered() {
        let spec = FilterSpecification::default().with_rating(RatingFilter::between(0.0, 10.0));
        assert_eq!(spec.active_filter_count(), 0);
    }

    #[test]
    fn test_full_rating_range_excluding_unrated_counts_as_active() {
        let spec = FilterSpecification::default()
            .with_rating(RatingFilter::between(0.0, 10.0).excluding_unrated());
        assert_eq!(spec.active_filter_count(), 1);
    }

    #[test]
    fn test_active_filter_count_stacks() {
        let spec = FilterSpecification::default()
            .with_status(StatusFilter::includes([WatchStatus::Completed]))
            .with_tags(TagFilter::new(TagOperator::All, ["favorite"]))
            .with_rewatch_count(RewatchFilter::at_least(1))
            .with_search("ghibli");
        assert_eq!(spec.active_filter_count(), 4);
    }

    #[test]
    fn test_empty_status_values_with_excludes_is_unrestricted() {
        let spec = FilterSpecification::default().with_status(StatusFilter::excludes([]));
        assert!(spec.is_default());
    }

    #[test]
    fn test_deserialize_partial_json_fills_defaults() {
        let json = r#"{
            "status": { "values": ["completed"], "operator": "includes" },
            "rating": { "min": 8, "max": 10, "includeUnrated": false }
        }"#;
        let spec: FilterSpecification = serde_json::from_str(json).unwrap();
        assert!(spec.status.values.contains(&WatchStatus::Completed));
        assert_eq!(spec.rating.min, 8.0);
        assert!(!spec.rating.include_unrated);
        assert!(spec.tags.is_unrestricted());
        assert!(spec.rewatch_count.is_unrestricted());
        assert_eq!(spec.date_range.field, DateField::AddedAt);
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let json = serde_json::to_value(FilterSpecification::default()).unwrap();
        assert!(json.get("dateRange").is_some());
        assert!(json.get("mediaType").is_some());
        assert!(json.get("rewatchCount").is_some());
        assert_eq!(json["rating"]["includeUnrated"], true);
        assert_eq!(json["dateRange"]["field"], "addedAt");
    }
}
