use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{bulk, handlers, middleware::metrics_middleware, presets, quick_filters, view};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // List view
        .route("/view", get(view::get_view))
        .route("/view/key", post(view::activate_key))
        .route("/view/refetch", post(view::refetch))
        .route("/view/filter", put(view::set_filter))
        .route("/view/filter", delete(view::reset_filter))
        .route("/view/sort", put(view::set_sort))
        .route("/view/search", post(view::type_search))
        // Quick filters
        .route("/quick-filters", get(quick_filters::list_quick_filters))
        .route(
            "/quick-filters/{id}/toggle",
            post(quick_filters::toggle_quick_filter),
        )
        // Presets
        .route("/presets", get(presets::list_presets))
        .route("/presets", post(presets::save_preset))
        .route("/presets/{id}", get(presets::get_preset))
        .route("/presets/{id}", delete(presets::remove_preset))
        .route("/presets/{id}/apply", post(presets::apply_preset))
        // Selection and bulk actions
        .route("/selection", get(bulk::get_selection))
        .route("/selection", put(bulk::set_selection))
        .route("/selection", delete(bulk::clear_selection))
        .route("/bulk", post(bulk::apply_bulk));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
