//! Fan-out of one mutation over many items.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::{MutationClient, MutationError, Selection};
use crate::fetch::ListDataController;
use crate::item::{ItemUpdate, WatchStatus};
use crate::metrics;

/// A change applied to every selected item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BulkMutation {
    SetStatus { status: WatchStatus },
    Delete,
    AddTag { tag: String },
}

impl BulkMutation {
    pub fn action(&self) -> &'static str {
        match self {
            BulkMutation::SetStatus { .. } => "set_status",
            BulkMutation::Delete => "delete",
            BulkMutation::AddTag { .. } => "add_tag",
        }
    }
}

/// One item whose mutation failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

/// Aggregate result of a bulk operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub total: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
    /// Whether a refetch of the active list was triggered afterwards.
    pub refetched: bool,
}

impl BulkOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Err` when any item failed.
    pub fn into_result(self) -> Result<BulkOutcome, BulkError> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(BulkError::PartialFailure {
                failed: self.failed.len(),
                total: self.total,
            })
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BulkError {
    #[error("{failed} of {total} item mutations failed")]
    PartialFailure { failed: usize, total: usize },
}

/// Issues one mutation per selected item and reconciles the list afterwards.
pub struct BulkMutationCoordinator {
    client: Arc<dyn MutationClient>,
    controller: ListDataController,
    selection: Mutex<Selection>,
}

impl BulkMutationCoordinator {
    pub fn new(client: Arc<dyn MutationClient>, controller: ListDataController) -> Self {
        Self {
            client,
            controller,
            selection: Mutex::new(Selection::new()),
        }
    }

    fn selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn toggle_selection(&self, id: &str) -> bool {
        self.selection().toggle(id)
    }

    pub fn select_all<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection().select_all(ids);
    }

    pub fn set_selection<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection().set(ids);
    }

    pub fn clear_selection(&self) {
        self.selection().clear();
    }

    pub fn selected(&self) -> Vec<String> {
        self.selection().selected()
    }

    /// Apply `mutation` to the current selection.
    pub async fn apply_to_selection(&self, mutation: BulkMutation) -> BulkOutcome {
        let ids = self.selected();
        self.apply_bulk(ids, mutation).await
    }

    /// Apply `mutation` to every id concurrently.
    ///
    /// All calls run to completion even when some fail. Afterwards the
    /// selection is cleared and, if the controller is idle, the active list
    /// is refetched so it reflects what the backend now holds.
    pub async fn apply_bulk(&self, ids: Vec<String>, mutation: BulkMutation) -> BulkOutcome {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        let action = mutation.action();

        info!(action, count = ids.len(), "Applying bulk mutation");

        let calls: Vec<_> = ids
            .iter()
            .map(|id| {
                let mutation = mutation.clone();
                async move {
                    let result = self.mutate_one(id, mutation).await;
                    (id.clone(), result)
                }
            })
            .collect();

        let results = futures::future::join_all(calls).await;

        let mut outcome = BulkOutcome {
            total: ids.len(),
            ..Default::default()
        };
        for (id, result) in results {
            match result {
                Ok(()) => {
                    metrics::BULK_MUTATIONS
                        .with_label_values(&[action, "success"])
                        .inc();
                    outcome.succeeded.push(id);
                }
                Err(e) => {
                    metrics::BULK_MUTATIONS
                        .with_label_values(&[action, "failed"])
                        .inc();
                    warn!(item_id = %id, error = %e, action, "Item mutation failed");
                    outcome.failed.push(BulkFailure {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.clear_selection();

        if !ids.is_empty() {
            outcome.refetched = self.controller.refetch_if_idle();
        }

        if outcome.failed.is_empty() {
            info!(action, total = outcome.total, "Bulk mutation complete");
        } else {
            warn!(
                "Bulk {} finished with {} of {} failures",
                action,
                outcome.failed.len(),
                outcome.total
            );
        }

        outcome
    }

    async fn mutate_one(&self, id: &str, mutation: BulkMutation) -> Result<(), MutationError> {
        match mutation {
            BulkMutation::SetStatus { status } => {
                self.client.mutate(id, ItemUpdate::status(status)).await
            }
            BulkMutation::AddTag { tag } => self.client.mutate(id, ItemUpdate::add_tag(tag)).await,
            BulkMutation::Delete => self.client.remove(id).await,
        }
    }
}
