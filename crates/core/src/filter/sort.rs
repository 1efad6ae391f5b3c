//! Sort comparators for list views.
//!
//! Sorting is always stable. Items with equal primary keys are ordered by
//! title ascending, then id ascending, so the output is deterministic no
//! matter what order the backend returned.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::evaluator::filter_items;
use super::spec::FilterSpecification;
use crate::item::TrackedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    DateAdded,
    Title,
    Rating,
    Score,
    Progress,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::DateAdded,
        SortKey::Title,
        SortKey::Rating,
        SortKey::Score,
        SortKey::Progress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateAdded => "date_added",
            SortKey::Title => "title",
            SortKey::Rating => "rating",
            SortKey::Score => "score",
            SortKey::Progress => "progress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A sort key plus direction, written as `"<key>_<direction>"` on the wire
/// (e.g. `"date_added_desc"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub const fn asc(key: SortKey) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub const fn desc(key: SortKey) -> Self {
        Self::new(key, SortDirection::Desc)
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::desc(SortKey::DateAdded)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.key.as_str(), self.direction.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = s
            .trim()
            .rsplit_once('_')
            .ok_or_else(|| format!("invalid sort order: {}", s))?;
        let key = SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| format!("unknown sort key: {}", key))?;
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(format!("unknown sort direction: {}", other)),
        };
        Ok(Self { key, direction })
    }
}

impl TryFrom<String> for SortOrder {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.to_string()
    }
}

// ============================================================================
// Comparators
// ============================================================================

/// Absent values order below every present value.
fn cmp_optional_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}

fn cmp_title(a: &TrackedItem, b: &TrackedItem) -> Ordering {
    a.catalog
        .title
        .to_lowercase()
        .cmp(&b.catalog.title.to_lowercase())
}

fn progress_ratio(item: &TrackedItem) -> Option<f64> {
    item.catalog
        .total_units()
        .map(|total| f64::from(item.progress) / f64::from(total))
}

fn cmp_primary(key: SortKey, a: &TrackedItem, b: &TrackedItem) -> Ordering {
    match key {
        SortKey::DateAdded => a.added_at.cmp(&b.added_at),
        SortKey::Title => cmp_title(a, b),
        SortKey::Rating => cmp_optional_f64(a.rating, b.rating),
        SortKey::Score => cmp_optional_f64(a.catalog.score, b.catalog.score),
        // Unknown totals sort below known ones, then by raw progress
        SortKey::Progress => cmp_optional_f64(progress_ratio(a), progress_ratio(b))
            .then_with(|| a.progress.cmp(&b.progress)),
    }
}

fn cmp_tie_break(key: SortKey, a: &TrackedItem, b: &TrackedItem) -> Ordering {
    let by_title = if key == SortKey::Title {
        Ordering::Equal
    } else {
        cmp_title(a, b)
    };
    by_title.then_with(|| a.id.cmp(&b.id))
}

/// Comparator for the given sort order.
///
/// Direction only flips the primary key; the title/id tie-break is always
/// ascending.
pub fn comparator_for(order: SortOrder) -> impl Fn(&TrackedItem, &TrackedItem) -> Ordering + Copy {
    move |a: &TrackedItem, b: &TrackedItem| {
        let primary = cmp_primary(order.key, a, b);
        let primary = match order.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| cmp_tie_break(order.key, a, b))
    }
}

/// Stable in-place sort.
pub fn sort_items(items: &mut [TrackedItem], order: SortOrder) {
    items.sort_by(comparator_for(order));
}

/// Filter then sort: the collection a list view renders.
pub fn apply_view(
    items: &[TrackedItem],
    spec: &FilterSpecification,
    order: SortOrder,
) -> Vec<TrackedItem> {
    let mut visible = filter_items(items, spec);
    sort_items(&mut visible, order);
    visible
}
