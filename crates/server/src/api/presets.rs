//! Filter preset API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use shelfview_core::{
    FilterPreset, PersistenceError, PresetError, RemoveConfirmation, RemoveOutcome,
};
use tracing::warn;

use super::handlers::{api_error, ApiError};
use super::view::FilterResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for saving the active filter as a preset
#[derive(Debug, Deserialize)]
pub struct SavePresetBody {
    pub name: String,
    pub description: Option<String>,
}

/// Query parameters for removing a preset
#[derive(Debug, Deserialize)]
pub struct RemovePresetParams {
    #[serde(default)]
    pub confirm: bool,
}

/// Response for listing presets
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPresetsResponse {
    pub presets: Vec<FilterPreset>,
    pub selected_id: Option<String>,
}

/// Response for removing a preset
#[derive(Debug, Serialize)]
pub struct RemovePresetResponse {
    pub id: String,
    pub removed: bool,
}

fn preset_error(e: PresetError) -> ApiError {
    let status = match &e {
        PresetError::Validation(_) => StatusCode::BAD_REQUEST,
        PresetError::NotFound(_) | PresetError::Persistence(PersistenceError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        PresetError::Persistence(_) => StatusCode::BAD_GATEWAY,
    };
    if status == StatusCode::BAD_GATEWAY {
        warn!(error = %e, "Preset persistence failed");
    }
    api_error(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// List presets
pub async fn list_presets(State(state): State<Arc<AppState>>) -> Json<ListPresetsResponse> {
    let presets = state.session().presets();
    Json(ListPresetsResponse {
        presets: presets.list(),
        selected_id: presets.selected_id(),
    })
}

/// Get a preset by ID
pub async fn get_preset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FilterPreset>, ApiError> {
    state
        .session()
        .presets()
        .get(&id)
        .map(Json)
        .ok_or_else(|| preset_error(PresetError::NotFound(id)))
}

/// Save the active filter as a new preset
pub async fn save_preset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SavePresetBody>,
) -> Result<(StatusCode, Json<FilterPreset>), ApiError> {
    let presets = state.session().presets();
    let spec = presets.active_spec();

    presets
        .save(&body.name, body.description, spec)
        .await
        .map(|preset| (StatusCode::CREATED, Json(preset)))
        .map_err(preset_error)
}

/// Apply a preset, replacing the active filter
pub async fn apply_preset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FilterResponse>, ApiError> {
    state
        .session()
        .apply_preset(&id)
        .map(|spec| Json(spec.into()))
        .map_err(preset_error)
}

/// Remove a preset. Requires `?confirm=true`.
pub async fn remove_preset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<RemovePresetParams>,
) -> Result<Json<RemovePresetResponse>, ApiError> {
    let outcome = state
        .session()
        .presets()
        .remove(&id, RemoveConfirmation::from(params.confirm))
        .await
        .map_err(preset_error)?;

    Ok(Json(RemovePresetResponse {
        id,
        removed: outcome == RemoveOutcome::Removed,
    }))
}
