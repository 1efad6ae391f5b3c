//! One-click filter toggles.
//!
//! A quick filter owns a few dimensions of the specification. Toggling it
//! while those dimensions hold its canonical values resets them to "match
//! all"; toggling it otherwise writes the canonical values. Dimensions the
//! filter does not own are left untouched, so quick filters stack with each
//! other and with manual edits.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::spec::{
    DateField, DateRangeFilter, FilterSpecification, MediaTypeFilter, RatingFilter,
    RewatchFilter, StatusFilter,
};
use crate::item::{MediaType, WatchStatus};

/// Window used by the "Recently Added" quick filter.
pub const RECENTLY_ADDED_DAYS: i64 = 30;

/// Canonical values for the dimensions a quick filter owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuickFilterTarget {
    pub status: Option<StatusFilter>,
    pub rating: Option<RatingFilter>,
    pub date_range: Option<DateRangeFilter>,
    pub media_type: Option<MediaTypeFilter>,
    pub rewatch_count: Option<RewatchFilter>,
}

impl QuickFilterTarget {
    fn holds_in(&self, spec: &FilterSpecification) -> bool {
        self.status.as_ref().is_none_or(|s| *s == spec.status)
            && self.rating.as_ref().is_none_or(|r| *r == spec.rating)
            && self.date_range.as_ref().is_none_or(|d| *d == spec.date_range)
            && self.media_type.as_ref().is_none_or(|m| *m == spec.media_type)
            && self
                .rewatch_count
                .as_ref()
                .is_none_or(|r| *r == spec.rewatch_count)
    }

    fn write_into(&self, spec: &FilterSpecification) -> FilterSpecification {
        let mut next = spec.clone();
        if let Some(status) = &self.status {
            next = next.with_status(status.clone());
        }
        if let Some(rating) = &self.rating {
            next = next.with_rating(rating.clone());
        }
        if let Some(date_range) = &self.date_range {
            next = next.with_date_range(date_range.clone());
        }
        if let Some(media_type) = &self.media_type {
            next = next.with_media_type(media_type.clone());
        }
        if let Some(rewatch_count) = &self.rewatch_count {
            next = next.with_rewatch_count(rewatch_count.clone());
        }
        next
    }

    fn reset_in(&self, spec: &FilterSpecification) -> FilterSpecification {
        let mut next = spec.clone();
        if self.status.is_some() {
            next = next.with_status(StatusFilter::default());
        }
        if self.rating.is_some() {
            next = next.with_rating(RatingFilter::default());
        }
        if self.date_range.is_some() {
            next = next.with_date_range(DateRangeFilter::default());
        }
        if self.media_type.is_some() {
            next = next.with_media_type(MediaTypeFilter::default());
        }
        if self.rewatch_count.is_some() {
            next = next.with_rewatch_count(RewatchFilter::default());
        }
        next
    }
}

/// A named, one-click filter.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickFilter {
    pub id: &'static str,
    pub label: &'static str,
    pub target: QuickFilterTarget,
}

impl QuickFilter {
    /// Whether the owned dimensions currently hold the canonical values.
    pub fn is_active(&self, spec: &FilterSpecification) -> bool {
        self.target.holds_in(spec)
    }

    /// On/off switch over the owned dimensions.
    pub fn toggle(&self, spec: &FilterSpecification) -> FilterSpecification {
        if self.is_active(spec) {
            self.target.reset_in(spec)
        } else {
            self.target.write_into(spec)
        }
    }
}

/// Quick filter plus its state against a given specification.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuickFilterState {
    pub id: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// The fixed set of quick filters offered by list views.
#[derive(Debug, Clone)]
pub struct QuickFilterCatalog {
    entries: Vec<QuickFilter>,
}

impl QuickFilterCatalog {
    /// The standard catalog. `today` anchors the "Recently Added" window.
    pub fn standard(today: NaiveDate) -> Self {
        let entries = vec![
            QuickFilter {
                id: "highly_rated",
                label: "Highly Rated",
                target: QuickFilterTarget {
                    rating: Some(RatingFilter::between(8.0, 10.0).excluding_unrated()),
                    ..Default::default()
                },
            },
            QuickFilter {
                id: "in_progress",
                label: "In Progress",
                target: QuickFilterTarget {
                    status: Some(StatusFilter::includes([
                        WatchStatus::Watching,
                        WatchStatus::Rewatching,
                    ])),
                    ..Default::default()
                },
            },
            QuickFilter {
                id: "completed",
                label: "Completed",
                target: QuickFilterTarget {
                    status: Some(StatusFilter::includes([WatchStatus::Completed])),
                    ..Default::default()
                },
            },
            QuickFilter {
                id: "rewatched",
                label: "Rewatched",
                target: QuickFilterTarget {
                    rewatch_count: Some(RewatchFilter::at_least(1)),
                    ..Default::default()
                },
            },
            QuickFilter {
                id: "recently_added",
                label: "Recently Added",
                target: QuickFilterTarget {
                    date_range: Some(DateRangeFilter::between(
                        DateField::AddedAt,
                        Some(today - Duration::days(RECENTLY_ADDED_DAYS)),
                        None,
                    )),
                    ..Default::default()
                },
            },
            QuickFilter {
                id: "anime_only",
                label: "Anime Only",
                target: QuickFilterTarget {
                    media_type: Some(MediaTypeFilter::of([MediaType::Anime])),
                    ..Default::default()
                },
            },
        ];
        Self { entries }
    }

    pub fn entries(&self) -> &[QuickFilter] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&QuickFilter> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Ids of the quick filters active for `spec`.
    pub fn active_ids(&self, spec: &FilterSpecification) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|entry| entry.is_active(spec))
            .map(|entry| entry.id)
            .collect()
    }

    pub fn states(&self, spec: &FilterSpecification) -> Vec<QuickFilterState> {
        self.entries
            .iter()
            .map(|entry| QuickFilterState {
                id: entry.id,
                label: entry.label,
                active: entry.is_active(spec),
            })
            .collect()
    }

    /// Toggle the quick filter `id`. Returns `None` for unknown ids.
    pub fn toggle(&self, id: &str, spec: &FilterSpecification) -> Option<FilterSpecification> {
        self.get(id).map(|entry| entry.toggle(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter_items, TagFilter, TagOperator};
    use crate::testing::fixtures;

    fn catalog() -> QuickFilterCatalog {
        QuickFilterCatalog::standard(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    #[test]
    fn test_ids_are_unique() {
        let catalog = catalog();
        let mut ids: Vec<_> = catalog.entries().iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.entries().len());
    }

    #[test]
    fn test_nothing_active_on_default_spec() {
        assert!(catalog()
            .active_ids(&FilterSpecification::default())
            .is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_default() {
        let catalog = catalog();
        let base = FilterSpecification::default();
        for entry in catalog.entries() {
            let on = entry.toggle(&base);
            assert!(entry.is_active(&on), "{} should be active", entry.id);
            assert!(!on.is_default());
            let off = entry.toggle(&on);
            assert!(!entry.is_active(&off));
            assert_eq!(off, base, "{} did not reset cleanly", entry.id);
        }
    }

    #[test]
    fn test_toggle_leaves_other_dimensions_alone() {
        let catalog = catalog();
        let base = FilterSpecification::default()
            .with_tags(TagFilter::new(TagOperator::Any, ["favorite"]))
            .with_search("ghibli");
        let on = catalog.toggle("highly_rated", &base).unwrap();
        assert_eq!(on.tags, base.tags);
        assert_eq!(on.search, base.search);
        let off = catalog.toggle("highly_rated", &on).unwrap();
        assert_eq!(off, base);
    }

    #[test]
    fn test_quick_filters_stack() {
        let catalog = catalog();
        let spec = catalog
            .toggle("completed", &FilterSpecification::default())
            .unwrap();
        let spec = catalog.toggle("highly_rated", &spec).unwrap();
        let mut active = catalog.active_ids(&spec);
        active.sort();
        assert_eq!(active, vec!["completed", "highly_rated"]);
    }

    #[test]
    fn test_conflicting_filters_share_a_dimension() {
        let catalog = catalog();
        let spec = catalog
            .toggle("completed", &FilterSpecification::default())
            .unwrap();
        // Same dimension: switching on "in progress" replaces "completed"
        let spec = catalog.toggle("in_progress", &spec).unwrap();
        assert_eq!(catalog.active_ids(&spec), vec!["in_progress"]);
    }

    #[test]
    fn test_manual_edit_deactivates_then_toggle_sets_canonical() {
        let catalog = catalog();
        let highly_rated = catalog.get("highly_rated").unwrap();
        let on = highly_rated.toggle(&FilterSpecification::default());
        let edited = on.with_rating(RatingFilter::between(9.0, 10.0).excluding_unrated());
        assert!(!highly_rated.is_active(&edited));
        let toggled = highly_rated.toggle(&edited);
        assert!(highly_rated.is_active(&toggled));
        assert_eq!(toggled.rating.min, 8.0);
    }

    #[test]
    fn test_unknown_id() {
        assert!(catalog()
            .toggle("nope", &FilterSpecification::default())
            .is_none());
    }

    #[test]
    fn test_highly_rated_matches_expected_items() {
        let catalog = catalog();
        let spec = catalog
            .toggle("highly_rated", &FilterSpecification::default())
            .unwrap();
        let items = fixtures::sample_collection();
        let matched = filter_items(&items, &spec);
        assert!(!matched.is_empty());
        assert!(matched
            .iter()
            .all(|item| item.rating.is_some_and(|r| r >= 8.0)));
    }

    #[test]
    fn test_states_report_active_flags() {
        let catalog = catalog();
        let spec = catalog
            .toggle("anime_only", &FilterSpecification::default())
            .unwrap();
        let states = catalog.states(&spec);
        assert_eq!(states.len(), catalog.entries().len());
        assert!(states.iter().any(|s| s.id == "anime_only" && s.active));
        assert_eq!(states.iter().filter(|s| s.active).count(), 1);
    }
}
