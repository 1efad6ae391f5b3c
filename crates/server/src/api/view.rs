//! List view API handlers.
//!
//! The view is the filtered and sorted projection of the active key's data,
//! together with the state needed to render filter chips and selection.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use shelfview_core::{FetchKey, FilterSpecification, ListView, SortOrder};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for reading the view
#[derive(Debug, Deserialize)]
pub struct ViewParams {
    /// Wait for the in-flight fetch (if any) to finish before answering
    #[serde(default)]
    pub wait: bool,
}

/// Request body for switching the active key
#[derive(Debug, Deserialize)]
pub struct ActivateBody {
    pub key: String,
}

/// Request body for changing the sort order
#[derive(Debug, Serialize, Deserialize)]
pub struct SortBody {
    pub sort: SortOrder,
}

/// Request body for typed search input
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub text: String,
}

/// Response for operations that may start a fetch
#[derive(Debug, Serialize)]
pub struct FetchStartedResponse {
    pub key: Option<FetchKey>,
    pub started: bool,
}

/// Response for filter changes
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    pub filter: FilterSpecification,
    pub active_filter_count: usize,
}

impl From<FilterSpecification> for FilterResponse {
    fn from(filter: FilterSpecification) -> Self {
        Self {
            active_filter_count: filter.active_filter_count(),
            filter,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the current view
pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Json<ListView> {
    let session = state.session();
    if params.wait {
        session.controller().wait_until_idle().await;
    }
    Json(session.view())
}

/// Switch the active key
pub async fn activate_key(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActivateBody>,
) -> Result<(StatusCode, Json<FetchStartedResponse>), ApiError> {
    let key = body.key.trim();
    if key.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "key must not be empty"));
    }

    let session = state.session();
    let started = session.activate(key);
    Ok((
        StatusCode::ACCEPTED,
        Json(FetchStartedResponse {
            key: session.controller().active_key(),
            started,
        }),
    ))
}

/// Re-fetch the active key
pub async fn refetch(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<FetchStartedResponse>), ApiError> {
    let session = state.session();
    let Some(key) = session.controller().active_key() else {
        return Err(api_error(StatusCode::CONFLICT, "no active list key"));
    };

    let started = session.refetch();
    let status = if started {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(FetchStartedResponse {
            key: Some(key),
            started,
        }),
    ))
}

/// Replace the active filter
pub async fn set_filter(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<FilterSpecification>,
) -> Json<FilterResponse> {
    Json(state.session().set_filter(spec).into())
}

/// Reset the active filter to the default
pub async fn reset_filter(State(state): State<Arc<AppState>>) -> Json<FilterResponse> {
    Json(state.session().reset_filter().into())
}

/// Change the sort order
pub async fn set_sort(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SortBody>,
) -> Json<SortBody> {
    state.session().set_sort(body.sort);
    Json(body)
}

/// Feed search input; the term is committed after the debounce delay
pub async fn type_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchBody>,
) -> StatusCode {
    state.session().type_search(body.text);
    StatusCode::ACCEPTED
}
