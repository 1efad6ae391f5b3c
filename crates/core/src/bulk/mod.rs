//! Bulk item mutations over a selection.

mod client;
mod coordinator;
mod selection;

pub use client::{MutationClient, MutationError};
pub use coordinator::{BulkError, BulkFailure, BulkMutation, BulkMutationCoordinator, BulkOutcome};
pub use selection::Selection;
