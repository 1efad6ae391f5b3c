//! Quick filter API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use shelfview_core::filter::QuickFilterState;

use super::handlers::{api_error, ApiError};
use super::view::FilterResponse;
use crate::state::AppState;

/// Response for listing quick filters
#[derive(Debug, Serialize)]
pub struct QuickFiltersResponse {
    pub quick_filters: Vec<QuickFilterState>,
}

/// List quick filters with their state against the active filter
pub async fn list_quick_filters(State(state): State<Arc<AppState>>) -> Json<QuickFiltersResponse> {
    Json(QuickFiltersResponse {
        quick_filters: state.session().quick_filter_states(),
    })
}

/// Toggle a quick filter on or off
pub async fn toggle_quick_filter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FilterResponse>, ApiError> {
    match state.session().toggle_quick_filter(&id) {
        Some(spec) => Ok(Json(spec.into())),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Quick filter not found: {}", id),
        )),
    }
}
