//! Boundary validation for records coming from the list-fetch collaborator.

use std::collections::BTreeSet;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::{CatalogItem, MediaType, RawCatalogItem, RawTrackedItem, TrackedItem, WatchStatus};
use crate::metrics;

/// Why a fetched record was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataShapeError {
    #[error("record has no identifier")]
    MissingId,

    #[error("record {0} has no catalog reference")]
    MissingCatalog(String),

    #[error("record {id} has an invalid catalog reference: {reason}")]
    InvalidCatalog { id: String, reason: String },

    #[error("record {id} has an invalid status: {reason}")]
    InvalidStatus { id: String, reason: String },

    #[error("record at position {index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },
}

impl DataShapeError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DataShapeError::MissingId => "missing_id",
            DataShapeError::MissingCatalog(_) => "missing_catalog",
            DataShapeError::InvalidCatalog { .. } => "invalid_catalog",
            DataShapeError::InvalidStatus { .. } => "invalid_status",
            DataShapeError::Malformed { .. } => "malformed",
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_catalog(id: &str, raw: RawCatalogItem) -> Result<CatalogItem, DataShapeError> {
    let invalid = |reason: &str| DataShapeError::InvalidCatalog {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let catalog_id = non_blank(raw.id).ok_or_else(|| invalid("missing catalog id"))?;
    let title = non_blank(raw.title).ok_or_else(|| invalid("missing title"))?;
    let media_type = raw
        .media_type
        .as_deref()
        .ok_or_else(|| invalid("missing media type"))?
        .parse::<MediaType>()
        .map_err(|e| invalid(&e))?;

    Ok(CatalogItem {
        id: catalog_id,
        title,
        alternate_titles: raw.alternate_titles,
        media_type,
        episodes: raw.episodes,
        chapters: raw.chapters,
        // NaN scores would poison comparisons downstream
        score: raw.score.filter(|s| s.is_finite()),
        genres: raw.genres,
        themes: raw.themes,
    })
}

impl TryFrom<RawTrackedItem> for TrackedItem {
    type Error = DataShapeError;

    fn try_from(raw: RawTrackedItem) -> Result<Self, Self::Error> {
        let id = non_blank(raw.id).ok_or(DataShapeError::MissingId)?;
        let catalog = raw
            .catalog
            .ok_or_else(|| DataShapeError::MissingCatalog(id.clone()))?;
        let catalog = validate_catalog(&id, catalog)?;

        let status = match raw.status.as_deref() {
            Some(tag) => tag
                .parse::<WatchStatus>()
                .map_err(|reason| DataShapeError::InvalidStatus {
                    id: id.clone(),
                    reason,
                })?,
            None => {
                return Err(DataShapeError::InvalidStatus {
                    id,
                    reason: "missing status".to_string(),
                })
            }
        };

        Ok(TrackedItem {
            id,
            status,
            rating: raw.rating.filter(|r| r.is_finite()),
            notes: raw.notes,
            tags: raw
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<BTreeSet<_>>(),
            added_at: raw.added_at,
            date_started: raw.date_started,
            date_completed: raw.date_completed,
            rewatch_count: raw.rewatch_count,
            progress: raw.progress.unwrap_or(0),
            catalog,
        })
    }
}

/// Decode each element of a fetched JSON array on its own.
///
/// Elements whose fields carry the wrong JSON types are dropped, logged and
/// counted; the others are returned in their original order.
pub fn decode_records(values: Vec<Value>) -> Vec<RawTrackedItem> {
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawTrackedItem>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                let e = DataShapeError::Malformed {
                    index,
                    reason: e.to_string(),
                };
                warn!("Dropping malformed record: {}", e);
                metrics::RECORDS_DROPPED.with_label_values(&[e.kind()]).inc();
            }
        }
    }
    records
}

/// Convert fetched records into view items, dropping malformed ones.
///
/// Dropped records are logged and counted; the rest of the collection is
/// returned in its original order.
pub fn sanitize_records(raw: Vec<RawTrackedItem>) -> Vec<TrackedItem> {
    let mut items = Vec::with_capacity(raw.len());
    for record in raw {
        match TrackedItem::try_from(record) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!("Dropping malformed record: {}", e);
                metrics::RECORDS_DROPPED.with_label_values(&[e.kind()]).inc();
            }
        }
    }
    items
}
