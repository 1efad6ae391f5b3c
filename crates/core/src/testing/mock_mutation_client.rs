//! Mock mutation client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::bulk::{MutationClient, MutationError};
use crate::item::ItemUpdate;

/// A recorded mutation call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedMutation {
    Update(String, ItemUpdate),
    Remove(String),
}

/// Mock implementation of the MutationClient trait.
///
/// Every call succeeds unless a failure was registered for its id.
#[derive(Debug, Default)]
pub struct MockMutationClient {
    failures: Mutex<HashMap<String, MutationError>>,
    recorded: Mutex<Vec<RecordedMutation>>,
    delay: Mutex<Duration>,
}

impl MockMutationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call for `id` fail with `error`.
    pub fn fail_for(&self, id: &str, error: MutationError) {
        self.failures.lock().unwrap().insert(id.to_string(), error);
    }

    /// Delay applied to every call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn recorded(&self) -> Vec<RecordedMutation> {
        self.recorded.lock().unwrap().clone()
    }

    async fn respond(&self, id: &str, call: RecordedMutation) -> Result<(), MutationError> {
        self.recorded.lock().unwrap().push(call);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.failures.lock().unwrap().get(id) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MutationClient for MockMutationClient {
    async fn mutate(&self, id: &str, update: ItemUpdate) -> Result<(), MutationError> {
        self.respond(id, RecordedMutation::Update(id.to_string(), update))
            .await
    }

    async fn remove(&self, id: &str) -> Result<(), MutationError> {
        self.respond(id, RecordedMutation::Remove(id.to_string()))
            .await
    }
}
