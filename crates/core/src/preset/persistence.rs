//! Preset persistence collaborator.

use async_trait::async_trait;
use thiserror::Error;

use super::{FilterPreset, NewPreset};

/// Errors reported by a preset persistence backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Trait for preset storage backends.
#[async_trait]
pub trait PresetPersistence: Send + Sync {
    /// All presets visible to the caller.
    async fn list(&self) -> Result<Vec<FilterPreset>, PersistenceError>;

    /// Persist a new preset, returning it with its assigned id.
    async fn create(&self, preset: NewPreset) -> Result<FilterPreset, PersistenceError>;

    /// Delete a preset.
    async fn delete(&self, id: &str) -> Result<(), PersistenceError>;

    /// Bump a preset's usage counter.
    async fn increment_usage(&self, id: &str) -> Result<(), PersistenceError>;
}
