//! Selection and bulk mutation API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use shelfview_core::{BulkMutation, BulkOutcome};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

/// Request body for replacing the selection
#[derive(Debug, Deserialize)]
pub struct SelectionBody {
    pub ids: Vec<String>,
}

/// Response for selection operations
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: Vec<String>,
}

/// Request body for a bulk action.
///
/// Without `ids` the action applies to the current selection.
#[derive(Debug, Deserialize)]
pub struct BulkBody {
    #[serde(flatten)]
    pub mutation: BulkMutation,
    pub ids: Option<Vec<String>>,
}

/// Get the current selection
pub async fn get_selection(State(state): State<Arc<AppState>>) -> Json<SelectionResponse> {
    Json(SelectionResponse {
        selected: state.session().bulk().selected(),
    })
}

/// Replace the selection
pub async fn set_selection(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectionBody>,
) -> Json<SelectionResponse> {
    let bulk = state.session().bulk();
    bulk.set_selection(body.ids);
    Json(SelectionResponse {
        selected: bulk.selected(),
    })
}

/// Clear the selection
pub async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session().bulk().clear_selection();
    StatusCode::NO_CONTENT
}

/// Apply a bulk action.
///
/// Answers 200 when every item succeeded and 207 when some failed. Failures
/// are listed per item in the body either way.
pub async fn apply_bulk(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkBody>,
) -> Result<(StatusCode, Json<BulkOutcome>), ApiError> {
    let bulk = state.session().bulk();

    let outcome = match body.ids {
        Some(ids) => bulk.apply_bulk(ids, body.mutation).await,
        None => bulk.apply_to_selection(body.mutation).await,
    };

    if outcome.total == 0 {
        return Err(api_error(StatusCode::BAD_REQUEST, "no items selected"));
    }

    let status = if outcome.is_complete_success() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(outcome)))
}
