//! List session lifecycle integration tests.
//!
//! These tests drive a full session through the scenarios a list view goes
//! through: rapid key switches, preset save/apply against SQLite, bulk edits
//! with partial failures and unmounting mid-fetch.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use shelfview_core::{
    filter::{RatingFilter, StatusFilter},
    item::RawTrackedItem,
    testing::{fixtures, MockListFetcher, MockMutationClient},
    BulkMutation, FetchKey, FetchPhase, FilterSpecification, ListFetcher, ListSession,
    MutationClient, MutationError, PresetPersistence, RemoveConfirmation, SessionOptions,
    SqlitePresetPersistence, WatchStatus,
};

/// Test helper holding a session and handles to its collaborators.
struct TestHarness {
    session: ListSession,
    fetcher: Arc<MockListFetcher>,
    mutations: Arc<MockMutationClient>,
    persistence: Arc<SqlitePresetPersistence>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("presets.db");

        let fetcher = Arc::new(MockListFetcher::new());
        let mutations = Arc::new(MockMutationClient::new());
        let persistence = Arc::new(
            SqlitePresetPersistence::new(&db_path).expect("Failed to create preset store"),
        );

        let session = ListSession::new(
            Arc::clone(&fetcher) as Arc<dyn ListFetcher>,
            Arc::clone(&mutations) as Arc<dyn MutationClient>,
            Arc::clone(&persistence) as Arc<dyn PresetPersistence>,
            SessionOptions {
                search_debounce: Duration::from_millis(50),
                ..Default::default()
            },
        );

        Self {
            session,
            fetcher,
            mutations,
            persistence,
            _temp_dir: temp_dir,
        }
    }

    fn raw(id: &str, title: &str, status: WatchStatus) -> RawTrackedItem {
        RawTrackedItem::from(&fixtures::tracked_item(id, title, status))
    }
}

#[tokio::test(start_paused = true)]
async fn test_rapid_key_switch_shows_only_latest_response() {
    let harness = TestHarness::new();

    // First "watching" request is slow and resolves after everything else
    harness.fetcher.push_response(
        "watching",
        Duration::from_millis(300),
        Ok(vec![TestHarness::raw("old", "Stale Entry", WatchStatus::Watching)]),
    );
    harness.fetcher.push_response(
        "completed",
        Duration::from_millis(100),
        Ok(vec![TestHarness::raw("c1", "Mushishi", WatchStatus::Completed)]),
    );
    harness.fetcher.push_response(
        "watching",
        Duration::from_millis(50),
        Ok(vec![TestHarness::raw("new", "Frieren", WatchStatus::Watching)]),
    );

    let session = &harness.session;
    assert!(session.activate("watching"));
    assert!(session.activate("completed"));
    assert!(session.activate("watching"));

    let snapshot = session.controller().wait_until_idle().await;
    assert_eq!(snapshot.key, Some(FetchKey::from("watching")));
    assert_eq!(snapshot.phase, FetchPhase::Settled);
    assert_eq!(snapshot.items[0].id, "new");

    // Let both superseded responses land
    tokio::time::sleep(Duration::from_millis(500)).await;

    let view = session.view();
    let ids: Vec<_> = view.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["new"]);
    assert!(view.error.is_none());

    let completed = session
        .controller()
        .snapshot_for(&FetchKey::from("completed"))
        .unwrap();
    assert_eq!(completed.phase, FetchPhase::Cancelled);
    assert!(completed.items.is_empty());
    assert_eq!(harness.fetcher.call_count("watching"), 2);
}

#[tokio::test]
async fn test_preset_save_apply_and_remove_against_sqlite() {
    let harness = TestHarness::new();
    let session = &harness.session;
    session.start("completed").await;

    let picks = FilterSpecification::default()
        .with_status(StatusFilter::includes([WatchStatus::Completed]))
        .with_rating(RatingFilter::between(8.0, 10.0).excluding_unrated());

    let saved = session
        .presets()
        .save("My Picks", None, picks.clone())
        .await
        .unwrap();
    assert_eq!(saved.usage_count, 0);
    assert_eq!(session.presets().selected_id(), Some(saved.id.clone()));

    // Drift away, then come back through the preset
    session.set_filter(FilterSpecification::default().with_search("bebop"));
    assert!(session.presets().selected_id().is_none());

    let applied = session.presets().apply(&saved.id).unwrap();
    assert_eq!(applied, picks);
    assert_eq!(session.filter(), picks);
    assert_eq!(session.presets().get(&saved.id).unwrap().usage_count, 1);

    // The detached increment reaches the database
    let mut persisted_usage = 0;
    for _ in 0..100 {
        persisted_usage = harness.persistence.list().await.unwrap()[0].usage_count;
        if persisted_usage == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(persisted_usage, 1);

    session
        .presets()
        .remove(&saved.id, RemoveConfirmation::Confirmed)
        .await
        .unwrap();
    assert!(session.presets().list().is_empty());
    assert!(session.presets().selected_id().is_none());
    assert!(harness.persistence.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_bulk_status_change_with_one_failure() {
    let harness = TestHarness::new();
    let items: Vec<RawTrackedItem> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| TestHarness::raw(id, &format!("Show {}", id), WatchStatus::Watching))
        .collect();
    harness.fetcher.set_items("watching", items);
    harness
        .mutations
        .fail_for("d", MutationError::Network("connection reset".into()));

    harness.mutations.set_delay(Duration::from_millis(100));

    let session = &harness.session;
    session.start("watching").await;
    session.controller().wait_until_idle().await;

    // What the backend holds once the mutations landed
    harness.fetcher.set_items(
        "watching",
        ["a", "b", "c", "d", "e"]
            .iter()
            .map(|id| {
                let status = if *id == "d" {
                    WatchStatus::Watching
                } else {
                    WatchStatus::Completed
                };
                TestHarness::raw(id, &format!("Show {}", id), status)
            })
            .collect(),
    );

    let visible: Vec<String> = session.visible_items().into_iter().map(|i| i.id).collect();
    session.bulk().select_all(visible);
    assert_eq!(session.view().selected_items.len(), 5);

    let started = tokio::time::Instant::now();
    let outcome = session
        .bulk()
        .apply_to_selection(BulkMutation::SetStatus {
            status: WatchStatus::Completed,
        })
        .await;
    // The five calls overlap instead of running back to back
    assert!(started.elapsed() < Duration::from_millis(200));

    assert_eq!(outcome.total, 5);
    assert_eq!(outcome.succeeded.len(), 4);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, "d");
    assert!(outcome.refetched);
    assert!(session.view().selected_items.is_empty());
    assert_eq!(harness.mutations.recorded().len(), 5);

    session.controller().wait_until_idle().await;
    assert_eq!(harness.fetcher.call_count("watching"), 2);

    let view = session.view();
    let statuses: Vec<(String, WatchStatus)> = view
        .items
        .iter()
        .map(|item| (item.id.clone(), item.status))
        .collect::<std::collections::BTreeMap<_, _>>()
        .into_iter()
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("a".to_string(), WatchStatus::Completed),
            ("b".to_string(), WatchStatus::Completed),
            ("c".to_string(), WatchStatus::Completed),
            ("d".to_string(), WatchStatus::Watching),
            ("e".to_string(), WatchStatus::Completed),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unmount_mid_fetch_leaves_no_error() {
    let harness = TestHarness::new();
    harness
        .fetcher
        .set_delay("watching", Duration::from_millis(200));
    harness.fetcher.set_items(
        "watching",
        vec![TestHarness::raw("1", "Frieren", WatchStatus::Watching)],
    );

    let session = &harness.session;
    session.start("watching").await;
    session.unmount();
    tokio::time::sleep(Duration::from_millis(400)).await;

    let view = session.view();
    assert_eq!(view.phase, FetchPhase::Cancelled);
    assert!(view.items.is_empty());
    assert!(view.error.is_none());
}

#[tokio::test]
async fn test_quick_filter_over_fetched_collection() {
    let harness = TestHarness::new();
    harness.fetcher.set_items(
        "all",
        fixtures::sample_collection()
            .iter()
            .map(RawTrackedItem::from)
            .collect(),
    );

    let session = &harness.session;
    session.start("all").await;
    session.controller().wait_until_idle().await;

    session.toggle_quick_filter("highly_rated").unwrap();
    let view = session.view();
    assert_eq!(view.active_filter_count, 1);
    assert!(view
        .items
        .iter()
        .all(|item| item.rating.is_some_and(|r| r >= 8.0)));
}
