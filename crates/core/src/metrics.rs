//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - List data controller (fetches started, outcomes, durations)
//! - Record sanitization (malformed records dropped)
//! - Bulk mutations and preset operations

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// List Data Controller
// =============================================================================

/// Fetches started total.
pub static FETCHES_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("shelfview_fetches_started_total", "Total list fetches started").unwrap()
});

/// Fetch outcomes by result.
pub static FETCH_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("shelfview_fetch_outcomes_total", "List fetch outcomes"),
        &["result"], // "success", "discarded", "cancelled", "timeout", ...
    )
    .unwrap()
});

/// Fetch duration in seconds.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shelfview_fetch_duration_seconds",
            "Duration of list fetches",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// Malformed records dropped at the controller boundary.
pub static RECORDS_DROPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shelfview_records_dropped_total",
            "Fetched records dropped because of an invalid shape",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Mutations and presets
// =============================================================================

/// Individual item mutations issued by bulk operations.
pub static BULK_MUTATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shelfview_bulk_mutations_total",
            "Item mutations issued by bulk operations",
        ),
        &["action", "result"], // result: "success", "failed"
    )
    .unwrap()
});

/// Preset operations by kind and result.
pub static PRESET_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("shelfview_preset_operations_total", "Filter preset operations"),
        &["operation", "result"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // List data controller
        Box::new(FETCHES_STARTED.clone()),
        Box::new(FETCH_OUTCOMES.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(RECORDS_DROPPED.clone()),
        // Mutations and presets
        Box::new(BULK_MUTATIONS.clone()),
        Box::new(PRESET_OPERATIONS.clone()),
    ]
}
