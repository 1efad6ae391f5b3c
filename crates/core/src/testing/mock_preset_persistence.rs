//! Mock preset persistence for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::time::Duration;

use crate::preset::{FilterPreset, NewPreset, PersistenceError, PresetPersistence};

/// Mock implementation of the PresetPersistence trait.
///
/// Provides controllable behavior for testing:
/// - Seed stored presets
/// - Per-operation failures (sticky until cleared with `None`)
/// - A delay on `create`, to observe optimistic saves
/// - Recorded usage increments and deletions
#[derive(Debug, Default)]
pub struct MockPresetPersistence {
    presets: Mutex<Vec<FilterPreset>>,
    next_id: Mutex<u64>,
    list_error: Mutex<Option<PersistenceError>>,
    create_error: Mutex<Option<PersistenceError>>,
    delete_error: Mutex<Option<PersistenceError>>,
    increment_error: Mutex<Option<PersistenceError>>,
    create_delay: Mutex<Duration>,
    usage_increments: Mutex<Vec<String>>,
    delete_calls: Mutex<Vec<String>>,
}

impl MockPresetPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: Vec<FilterPreset>) -> Self {
        let mock = Self::new();
        *mock.presets.lock().unwrap() = presets;
        mock
    }

    pub fn set_list_error(&self, error: Option<PersistenceError>) {
        *self.list_error.lock().unwrap() = error;
    }

    pub fn set_create_error(&self, error: Option<PersistenceError>) {
        *self.create_error.lock().unwrap() = error;
    }

    pub fn set_delete_error(&self, error: Option<PersistenceError>) {
        *self.delete_error.lock().unwrap() = error;
    }

    pub fn set_increment_error(&self, error: Option<PersistenceError>) {
        *self.increment_error.lock().unwrap() = error;
    }

    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = delay;
    }

    /// Presets currently held by the mock.
    pub fn stored(&self) -> Vec<FilterPreset> {
        self.presets.lock().unwrap().clone()
    }

    /// Ids passed to `increment_usage`, including failed attempts.
    pub fn usage_increments(&self) -> Vec<String> {
        self.usage_increments.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Yield until at least `count` usage increments were attempted.
    ///
    /// Increments run in detached tasks, so tests need a way to let them
    /// catch up.
    pub async fn wait_for_usage_increments(&self, count: usize) {
        for _ in 0..100 {
            if self.usage_increments.lock().unwrap().len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PresetPersistence for MockPresetPersistence {
    async fn list(&self) -> Result<Vec<FilterPreset>, PersistenceError> {
        if let Some(error) = self.list_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.stored())
    }

    async fn create(&self, preset: NewPreset) -> Result<FilterPreset, PersistenceError> {
        let delay = *self.create_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.create_error.lock().unwrap().clone() {
            return Err(error);
        }

        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            format!("preset-{}", next_id)
        };
        let created = FilterPreset {
            id,
            name: preset.name,
            description: preset.description,
            filter_specification: preset.filter_specification,
            is_default: preset.is_default,
            is_public: preset.is_public,
            usage_count: 0,
            created_at: Utc::now(),
        };
        self.presets.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        self.delete_calls.lock().unwrap().push(id.to_string());
        if let Some(error) = self.delete_error.lock().unwrap().clone() {
            return Err(error);
        }

        let mut presets = self.presets.lock().unwrap();
        let before = presets.len();
        presets.retain(|p| p.id != id);
        if presets.len() == before {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn increment_usage(&self, id: &str) -> Result<(), PersistenceError> {
        self.usage_increments.lock().unwrap().push(id.to_string());
        if let Some(error) = self.increment_error.lock().unwrap().clone() {
            return Err(error);
        }

        let mut presets = self.presets.lock().unwrap();
        match presets.iter_mut().find(|p| p.id == id) {
            Some(preset) => {
                preset.usage_count += 1;
                Ok(())
            }
            None => Err(PersistenceError::NotFound(id.to_string())),
        }
    }
}
