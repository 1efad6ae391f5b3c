//! Filtering and ordering of tracked items.
//!
//! - [`FilterSpecification`]: the declarative "what to show" value
//! - [`matches`]: predicate evaluation of one item against a specification
//! - [`comparator_for`] / [`sort_items`]: stable multi-key ordering
//! - [`QuickFilterCatalog`]: one-click toggles over the specification

mod evaluator;
mod quick;
mod sort;
mod spec;

pub use evaluator::{
    filter_items, matches, matches_date_range, matches_media_type, matches_rating,
    matches_rewatch_count, matches_search, matches_status, matches_tags,
};
pub use quick::{
    QuickFilter, QuickFilterCatalog, QuickFilterState, QuickFilterTarget, RECENTLY_ADDED_DAYS,
};
pub use sort::{apply_view, comparator_for, sort_items, SortDirection, SortKey, SortOrder};
pub use spec::*;
