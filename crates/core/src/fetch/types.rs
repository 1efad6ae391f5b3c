//! Fetch lifecycle types.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::TrackedItem;

/// Logical identity of one list view's data, e.g. a status bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchKey(String);

impl FetchKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FetchKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for FetchKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Errors from a list fetch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The request was abandoned. Never shown to the user.
    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with an error.
    #[error("Backend error: {0}")]
    Application(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// Label used for the fetch outcome metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            FetchError::Cancelled => "cancelled",
            FetchError::Network(_) => "network_error",
            FetchError::Timeout(_) => "timeout",
            FetchError::Application(_) => "application_error",
        }
    }
}

/// Observable phase of the most recent fetch for a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching,
    Settled,
    Cancelled,
    Failed,
}

impl FetchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchPhase::Idle => "idle",
            FetchPhase::Fetching => "fetching",
            FetchPhase::Settled => "settled",
            FetchPhase::Cancelled => "cancelled",
            FetchPhase::Failed => "failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        *self == FetchPhase::Fetching
    }
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a view sees for one key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot {
    pub key: Option<FetchKey>,
    pub phase: FetchPhase,
    pub items: Vec<TrackedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Sequence number of the response the items came from (0 = none yet).
    pub sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}
