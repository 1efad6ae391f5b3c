use async_trait::async_trait;
use thiserror::Error;

use crate::item::ItemUpdate;

/// Errors from a single item mutation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MutationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Mutation rejected: {0}")]
    Rejected(String),

    #[error("Item not found: {0}")]
    NotFound(String),
}

/// Backend for per-item writes.
#[async_trait]
pub trait MutationClient: Send + Sync {
    async fn mutate(&self, id: &str, update: ItemUpdate) -> Result<(), MutationError>;

    async fn remove(&self, id: &str) -> Result<(), MutationError>;
}
