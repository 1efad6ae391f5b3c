//! Filter preset data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::FilterSpecification;

/// A named, reusable filter specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterPreset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub filter_specification: FilterSpecification,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Request to persist a new preset. The persistence layer assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPreset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub filter_specification: FilterSpecification,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_public: bool,
}

impl NewPreset {
    pub fn new(name: impl Into<String>, filter_specification: FilterSpecification) -> Self {
        Self {
            name: name.into(),
            description: None,
            filter_specification,
            is_default: false,
            is_public: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Explicit user answer to "delete this preset?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveConfirmation {
    Confirmed,
    Declined,
}

impl From<bool> for RemoveConfirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            RemoveConfirmation::Confirmed
        } else {
            RemoveConfirmation::Declined
        }
    }
}

/// Result of a remove request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Declined,
}
