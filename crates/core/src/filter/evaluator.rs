//! Predicate evaluation of tracked items against a filter specification.
//!
//! Every function here is total: missing item fields are treated as "no
//! value" and handled per dimension, never as an error.

use chrono::NaiveDate;

use super::spec::{
    DateField, DateRangeFilter, FilterSpecification, MediaTypeFilter, RatingFilter,
    RewatchFilter, StatusFilter, StatusOperator, TagFilter, TagOperator,
};
use crate::item::TrackedItem;

/// Whether `item` passes every dimension of `spec`.
pub fn matches(item: &TrackedItem, spec: &FilterSpecification) -> bool {
    matches_status(item, &spec.status)
        && matches_rating(item, &spec.rating)
        && matches_tags(item, &spec.tags)
        && matches_date_range(item, &spec.date_range)
        && matches_media_type(item, &spec.media_type)
        && matches_rewatch_count(item, &spec.rewatch_count)
        && matches_search(item, spec.search_term())
}

/// Items from `items` that match `spec`, in their original order.
pub fn filter_items<'a, I>(items: I, spec: &FilterSpecification) -> Vec<TrackedItem>
where
    I: IntoIterator<Item = &'a TrackedItem>,
{
    items
        .into_iter()
        .filter(|item| matches(item, spec))
        .cloned()
        .collect()
}

pub fn matches_status(item: &TrackedItem, filter: &StatusFilter) -> bool {
    if filter.values.is_empty() {
        return true;
    }
    let contained = filter.values.contains(&item.status);
    match filter.operator {
        StatusOperator::Includes => contained,
        StatusOperator::Excludes => !contained,
    }
}

pub fn matches_rating(item: &TrackedItem, filter: &RatingFilter) -> bool {
    match item.rating {
        None => filter.include_unrated,
        Some(rating) => filter.min <= rating && rating <= filter.max,
    }
}

pub fn matches_tags(item: &TrackedItem, filter: &TagFilter) -> bool {
    if filter.values.is_empty() {
        return true;
    }
    match filter.operator {
        TagOperator::Any => filter.values.iter().any(|tag| item.tags.contains(tag)),
        TagOperator::All => filter.values.iter().all(|tag| item.tags.contains(tag)),
        TagOperator::None => !filter.values.iter().any(|tag| item.tags.contains(tag)),
    }
}

fn date_of(item: &TrackedItem, field: DateField) -> Option<NaiveDate> {
    match field {
        DateField::AddedAt => item.added_at.map(|at| at.date_naive()),
        DateField::DateStarted => item.date_started,
        DateField::DateCompleted => item.date_completed,
    }
}

pub fn matches_date_range(item: &TrackedItem, filter: &DateRangeFilter) -> bool {
    if filter.is_unrestricted() {
        return true;
    }
    let Some(date) = date_of(item, filter.field) else {
        return false;
    };
    filter.start.is_none_or(|start| date >= start) && filter.end.is_none_or(|end| date <= end)
}

pub fn matches_media_type(item: &TrackedItem, filter: &MediaTypeFilter) -> bool {
    filter.values.is_empty() || filter.values.contains(&item.catalog.media_type)
}

pub fn matches_rewatch_count(item: &TrackedItem, filter: &RewatchFilter) -> bool {
    let count = item.rewatch_count.unwrap_or(0);
    filter.min <= count && count <= filter.max
}

/// Case-insensitive substring match over the item's searchable text.
///
/// `term` is expected to be trimmed already (see
/// [`FilterSpecification::search_term`]).
pub fn matches_search(item: &TrackedItem, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    searchable_text(item).contains(&needle)
}

/// Lowercased concatenation of the searchable fields, one per line.
///
/// The newline separator keeps a term from matching across two fields.
fn searchable_text(item: &TrackedItem) -> String {
    let catalog = &item.catalog;
    std::iter::once(catalog.title.as_str())
        .chain(catalog.alternate_titles.iter().map(String::as_str))
        .chain(catalog.genres.iter().map(String::as_str))
        .chain(catalog.themes.iter().map(String::as_str))
        .chain(item.notes.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
