//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Shelfview server:
//! - HTTP request metrics (latency, counts, errors)
//! - List session state (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shelfview_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("shelfview_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfview_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// List Session Metrics
// =============================================================================

/// Items fetched for the active key, before filtering.
pub static LIST_ITEMS_FETCHED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfview_list_items_fetched",
        "Items fetched for the active list key",
    )
    .unwrap()
});

/// Items left after the active filter.
pub static LIST_ITEMS_VISIBLE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfview_list_items_visible",
        "Items visible after filtering",
    )
    .unwrap()
});

/// Whether a fetch is in flight for the active key.
pub static LIST_FETCH_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfview_list_fetch_in_flight",
        "Whether a list fetch is in flight (1 = yes, 0 = no)",
    )
    .unwrap()
});

/// Presets held by the local preset store.
pub static PRESETS_STORED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("shelfview_presets_stored", "Filter presets in the local store").unwrap()
});

/// Items currently selected for bulk actions.
pub static SELECTION_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfview_selection_size",
        "Items selected for bulk actions",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // List session
    registry
        .register(Box::new(LIST_ITEMS_FETCHED.clone()))
        .unwrap();
    registry
        .register(Box::new(LIST_ITEMS_VISIBLE.clone()))
        .unwrap();
    registry
        .register(Box::new(LIST_FETCH_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(PRESETS_STORED.clone()))
        .unwrap();
    registry
        .register(Box::new(SELECTION_SIZE.clone()))
        .unwrap();

    // Core metrics (fetches, sanitization, bulk mutations, presets)
    for metric in shelfview_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from the current list session.
///
/// Called before encoding so the gauges reflect the session at scrape time.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let session = state.session();
    let view = session.view();

    LIST_ITEMS_FETCHED.set(view.total as i64);
    LIST_ITEMS_VISIBLE.set(view.items.len() as i64);
    LIST_FETCH_IN_FLIGHT.set(if view.phase.is_in_flight() { 1 } else { 0 });
    PRESETS_STORED.set(session.presets().list().len() as i64);
    SELECTION_SIZE.set(view.selected_items.len() as i64);
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = uuid_regex.replace_all(path, "{id}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}
