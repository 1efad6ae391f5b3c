//! In-memory preset list plus the active filter specification.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    FilterPreset, NewPreset, PersistenceError, PresetPersistence, RemoveConfirmation,
    RemoveOutcome,
};
use crate::filter::FilterSpecification;
use crate::metrics;

/// Id prefix of presets saved locally but not yet confirmed by persistence.
const PROVISIONAL_PREFIX: &str = "pending-";

/// Errors from preset store operations.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Default)]
struct PresetState {
    presets: Vec<FilterPreset>,
    selected: Option<String>,
    active: FilterSpecification,
}

/// Owns the local preset list, the selection pointer and the active
/// specification.
///
/// Every change to the active specification goes through this store. Manual
/// edits clear the selection; applying a preset sets both.
pub struct PresetStore {
    persistence: Arc<dyn PresetPersistence>,
    state: Mutex<PresetState>,
}

impl PresetStore {
    pub fn new(persistence: Arc<dyn PresetPersistence>) -> Self {
        Self {
            persistence,
            state: Mutex::new(PresetState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PresetState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load presets from persistence. Failures leave the list empty and are
    /// only logged: filtering must keep working without presets.
    pub async fn load(&self) -> usize {
        match self.persistence.list().await {
            Ok(presets) => {
                let count = presets.len();
                let mut state = self.state();
                state.presets = presets;
                if let Some(selected) = state.selected.clone() {
                    if !state.presets.iter().any(|p| p.id == selected) {
                        state.selected = None;
                    }
                }
                metrics::PRESET_OPERATIONS
                    .with_label_values(&["load", "success"])
                    .inc();
                info!(count, "Loaded filter presets");
                count
            }
            Err(e) => {
                metrics::PRESET_OPERATIONS
                    .with_label_values(&["load", "failed"])
                    .inc();
                warn!(error = %e, "Failed to load filter presets, continuing without them");
                0
            }
        }
    }

    pub fn list(&self) -> Vec<FilterPreset> {
        self.state().presets.clone()
    }

    pub fn get(&self, id: &str) -> Option<FilterPreset> {
        self.state().presets.iter().find(|p| p.id == id).cloned()
    }

    /// Save `spec` as a new preset.
    ///
    /// The preset appears in the local list and becomes the selection before
    /// persistence answers. If persistence fails the provisional entry is
    /// withdrawn and the error returned. Uses recorded while the entry was
    /// provisional are carried over and replayed against the saved id.
    pub async fn save(
        &self,
        name: &str,
        description: Option<String>,
        spec: FilterSpecification,
    ) -> Result<FilterPreset, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            metrics::PRESET_OPERATIONS
                .with_label_values(&["save", "invalid"])
                .inc();
            return Err(PresetError::Validation(
                "preset name must not be blank".to_string(),
            ));
        }
        if spec.is_default() {
            metrics::PRESET_OPERATIONS
                .with_label_values(&["save", "invalid"])
                .inc();
            return Err(PresetError::Validation(
                "a preset needs at least one active filter".to_string(),
            ));
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let provisional_id = format!("{}{}", PROVISIONAL_PREFIX, uuid::Uuid::new_v4());
        let provisional = FilterPreset {
            id: provisional_id.clone(),
            name: name.to_string(),
            description: description.clone(),
            filter_specification: spec.clone(),
            is_default: false,
            is_public: false,
            usage_count: 0,
            created_at: Utc::now(),
        };

        {
            let mut state = self.state();
            state.presets.push(provisional);
            state.selected = Some(provisional_id.clone());
            state.active = spec.clone();
        }

        let request = NewPreset {
            name: name.to_string(),
            description,
            filter_specification: spec,
            is_default: false,
            is_public: false,
        };

        match self.persistence.create(request).await {
            Ok(mut saved) => {
                let deferred_uses = {
                    let mut state = self.state();
                    let position = state.presets.iter().position(|p| p.id == provisional_id);
                    let deferred_uses = match position {
                        Some(index) => {
                            let uses = state.presets[index].usage_count;
                            saved.usage_count += uses;
                            state.presets[index] = saved.clone();
                            uses
                        }
                        None => {
                            state.presets.push(saved.clone());
                            0
                        }
                    };
                    if state.selected.as_deref() == Some(provisional_id.as_str()) {
                        state.selected = Some(saved.id.clone());
                    }
                    deferred_uses
                };
                for _ in 0..deferred_uses {
                    self.record_usage(&saved.id);
                }
                metrics::PRESET_OPERATIONS
                    .with_label_values(&["save", "success"])
                    .inc();
                info!(preset_id = %saved.id, name = %saved.name, "Saved filter preset");
                Ok(saved)
            }
            Err(e) => {
                let mut state = self.state();
                state.presets.retain(|p| p.id != provisional_id);
                if state.selected.as_deref() == Some(provisional_id.as_str()) {
                    state.selected = None;
                }
                metrics::PRESET_OPERATIONS
                    .with_label_values(&["save", "failed"])
                    .inc();
                warn!(error = %e, name = %name, "Failed to save filter preset");
                Err(e.into())
            }
        }
    }

    /// Replace the active specification with the preset's and select it.
    ///
    /// The usage counter is bumped locally right away and remotely in a
    /// detached task whose failure is logged and otherwise ignored.
    pub fn apply(&self, id: &str) -> Result<FilterSpecification, PresetError> {
        let spec = {
            let mut state = self.state();
            let preset = state
                .presets
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| PresetError::NotFound(id.to_string()))?;
            preset.usage_count += 1;
            let spec = preset.filter_specification.clone();
            state.active = spec.clone();
            state.selected = Some(id.to_string());
            spec
        };

        metrics::PRESET_OPERATIONS
            .with_label_values(&["apply", "success"])
            .inc();
        debug!(preset_id = %id, "Applied filter preset");

        // Provisional presets are counted once `save` learns the real id
        if !id.starts_with(PROVISIONAL_PREFIX) {
            self.record_usage(id);
        }

        Ok(spec)
    }

    fn record_usage(&self, id: &str) {
        let persistence = Arc::clone(&self.persistence);
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = persistence.increment_usage(&id).await {
                metrics::PRESET_OPERATIONS
                    .with_label_values(&["increment_usage", "failed"])
                    .inc();
                warn!(preset_id = %id, error = %e, "Failed to record preset usage");
            }
        });
    }

    /// Delete a preset. Nothing happens unless the caller confirmed.
    pub async fn remove(
        &self,
        id: &str,
        confirmation: RemoveConfirmation,
    ) -> Result<RemoveOutcome, PresetError> {
        if confirmation == RemoveConfirmation::Declined {
            debug!(preset_id = %id, "Preset removal declined");
            return Ok(RemoveOutcome::Declined);
        }

        if self.get(id).is_none() {
            return Err(PresetError::NotFound(id.to_string()));
        }

        if let Err(e) = self.persistence.delete(id).await {
            metrics::PRESET_OPERATIONS
                .with_label_values(&["remove", "failed"])
                .inc();
            warn!(preset_id = %id, error = %e, "Failed to delete filter preset");
            return Err(e.into());
        }

        let mut state = self.state();
        state.presets.retain(|p| p.id != id);
        if state.selected.as_deref() == Some(id) {
            state.selected = None;
        }
        metrics::PRESET_OPERATIONS
            .with_label_values(&["remove", "success"])
            .inc();
        info!(preset_id = %id, "Removed filter preset");

        Ok(RemoveOutcome::Removed)
    }

    /// Apply a manual edit to the active specification. Clears the selection.
    pub fn edit_active<F>(&self, edit: F) -> FilterSpecification
    where
        F: FnOnce(&FilterSpecification) -> FilterSpecification,
    {
        let mut state = self.state();
        let next = edit(&state.active);
        state.active = next.clone();
        state.selected = None;
        next
    }

    pub fn set_active(&self, spec: FilterSpecification) -> FilterSpecification {
        self.edit_active(|_| spec)
    }

    /// Back to "match all".
    pub fn reset(&self) -> FilterSpecification {
        self.set_active(FilterSpecification::default())
    }

    pub fn active_spec(&self) -> FilterSpecification {
        self.state().active.clone()
    }

    pub fn active_filter_count(&self) -> usize {
        self.state().active.active_filter_count()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.state().selected.clone()
    }

    pub fn selected(&self) -> Option<FilterPreset> {
        let state = self.state();
        let id = state.selected.as_deref()?;
        state.presets.iter().find(|p| p.id == id).cloned()
    }
}
