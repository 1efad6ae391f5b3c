//! One list view: data, filters, ordering, presets and bulk actions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::bulk::{BulkMutationCoordinator, MutationClient};
use crate::debounce::Debouncer;
use crate::fetch::{FetchKey, FetchPhase, ListDataController, ListFetcher, ListSnapshot};
use crate::filter::{apply_view, FilterSpecification, QuickFilterCatalog, QuickFilterState, SortOrder};
use crate::item::TrackedItem;
use crate::preset::{PresetError, PresetPersistence, PresetStore};

/// Tunables for a [`ListSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub default_sort: SortOrder,
    pub fetch_timeout: Duration,
    pub search_debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_sort: SortOrder::default(),
            fetch_timeout: crate::fetch::DEFAULT_FETCH_TIMEOUT,
            search_debounce: Duration::from_millis(300),
        }
    }
}

impl From<&crate::config::ListConfig> for SessionOptions {
    fn from(config: &crate::config::ListConfig) -> Self {
        Self {
            default_sort: config.default_sort,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            search_debounce: Duration::from_millis(config.search_debounce_ms),
        }
    }
}

/// Everything a list view renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub key: Option<FetchKey>,
    pub phase: FetchPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Items fetched for the key, before filtering.
    pub total: usize,
    pub sort: SortOrder,
    pub filter: FilterSpecification,
    pub active_filter_count: usize,
    pub active_quick_filters: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_preset: Option<String>,
    pub selected_items: Vec<String>,
    pub items: Vec<TrackedItem>,
}

/// Wires the controller, preset store, quick filters and bulk coordinator
/// into a single list view.
pub struct ListSession {
    controller: ListDataController,
    presets: Arc<PresetStore>,
    bulk: BulkMutationCoordinator,
    sort: Mutex<SortOrder>,
    search: Debouncer,
}

impl ListSession {
    pub fn new(
        fetcher: Arc<dyn ListFetcher>,
        mutations: Arc<dyn MutationClient>,
        persistence: Arc<dyn PresetPersistence>,
        options: SessionOptions,
    ) -> Self {
        let controller = ListDataController::new(fetcher, options.fetch_timeout);
        let bulk = BulkMutationCoordinator::new(mutations, controller.clone());

        Self {
            controller,
            presets: Arc::new(PresetStore::new(persistence)),
            bulk,
            sort: Mutex::new(options.default_sort),
            search: Debouncer::new(options.search_debounce),
        }
    }

    /// Load presets and activate the initial key.
    pub async fn start(&self, initial_key: impl Into<FetchKey>) {
        let presets = self.presets.load().await;
        let key = initial_key.into();
        info!(key = %key, presets, "Starting list session");
        self.controller.activate(key);
    }

    pub fn controller(&self) -> &ListDataController {
        &self.controller
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn bulk(&self) -> &BulkMutationCoordinator {
        &self.bulk
    }

    pub fn activate(&self, key: impl Into<FetchKey>) -> bool {
        self.controller.activate(key)
    }

    pub fn refetch(&self) -> bool {
        self.controller.refetch()
    }

    pub fn sort(&self) -> SortOrder {
        *self.sort.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_sort(&self, order: SortOrder) {
        debug!(sort = %order, "Sort changed");
        *self.sort.lock().unwrap_or_else(|e| e.into_inner()) = order;
    }

    pub fn filter(&self) -> FilterSpecification {
        self.presets.active_spec()
    }

    /// Replace the working filter. Detaches any selected preset.
    pub fn set_filter(&self, spec: FilterSpecification) -> FilterSpecification {
        self.search.cancel();
        self.presets.set_active(spec)
    }

    pub fn reset_filter(&self) -> FilterSpecification {
        self.search.cancel();
        self.presets.reset()
    }

    /// Make a saved preset's specification the working filter.
    ///
    /// Search input still waiting on the debounce is dropped so it cannot
    /// land on top of the preset.
    pub fn apply_preset(&self, id: &str) -> Result<FilterSpecification, PresetError> {
        self.search.cancel();
        self.presets.apply(id)
    }

    /// Feed search input. The term is committed once typing pauses.
    pub fn type_search(&self, text: impl Into<String>) {
        let text = text.into();
        let presets = Arc::clone(&self.presets);
        self.search.call(move || {
            let current = presets.active_spec();
            if current.search == text {
                return;
            }
            debug!(search = %text, "Applying search term");
            presets.edit_active(|spec| spec.with_search(text));
        });
    }

    fn quick_filters(&self) -> QuickFilterCatalog {
        QuickFilterCatalog::standard(Utc::now().date_naive())
    }

    pub fn quick_filter_states(&self) -> Vec<QuickFilterState> {
        self.quick_filters().states(&self.presets.active_spec())
    }

    /// Toggle a quick filter. `None` for unknown ids.
    pub fn toggle_quick_filter(&self, id: &str) -> Option<FilterSpecification> {
        let catalog = self.quick_filters();
        catalog.get(id)?;
        Some(
            self.presets
                .edit_active(|spec| catalog.toggle(id, spec).unwrap_or_else(|| spec.clone())),
        )
    }

    /// Filtered, sorted items of the active key.
    pub fn visible_items(&self) -> Vec<TrackedItem> {
        let snapshot = self.controller.snapshot();
        apply_view(&snapshot.items, &self.presets.active_spec(), self.sort())
    }

    pub fn view(&self) -> ListView {
        let ListSnapshot {
            key,
            phase,
            items,
            error,
            ..
        } = self.controller.snapshot();
        let filter = self.presets.active_spec();
        let sort = self.sort();

        ListView {
            key,
            phase,
            error,
            total: items.len(),
            sort,
            active_filter_count: filter.active_filter_count(),
            active_quick_filters: self.quick_filters().active_ids(&filter),
            selected_preset: self.presets.selected_id(),
            selected_items: self.bulk.selected(),
            items: apply_view(&items, &filter, sort),
            filter,
        }
    }

    /// Stop all outstanding work.
    pub fn unmount(&self) {
        self.search.cancel();
        self.controller.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortKey;
    use crate::item::{RawTrackedItem, WatchStatus};
    use crate::testing::{fixtures, MockListFetcher, MockMutationClient, MockPresetPersistence};

    fn session(fetcher: &Arc<MockListFetcher>) -> ListSession {
        ListSession::new(
            Arc::clone(fetcher) as Arc<dyn ListFetcher>,
            Arc::new(MockMutationClient::new()),
            Arc::new(MockPresetPersistence::new()),
            SessionOptions {
                search_debounce: Duration::from_millis(200),
                ..Default::default()
            },
        )
    }

    fn seeded_fetcher() -> Arc<MockListFetcher> {
        let fetcher = Arc::new(MockListFetcher::new());
        fetcher.set_items(
            "all",
            fixtures::sample_collection()
                .iter()
                .map(RawTrackedItem::from)
                .collect(),
        );
        fetcher
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_filters_and_sorts() {
        let fetcher = seeded_fetcher();
        let session = session(&fetcher);
        session.start("all").await;
        session.controller().wait_until_idle().await;

        session.set_sort(SortOrder::asc(SortKey::Title));
        let total = session.view().total;
        assert_eq!(total, fixtures::sample_collection().len());

        session.toggle_quick_filter("completed").unwrap();
        let view = session.view();
        assert_eq!(view.phase, FetchPhase::Settled);
        assert_eq!(view.active_quick_filters, vec!["completed"]);
        assert_eq!(view.active_filter_count, 1);
        assert!(!view.items.is_empty());
        assert!(view
            .items
            .iter()
            .all(|item| item.status == WatchStatus::Completed));
        let titles: Vec<_> = view.items.iter().map(|i| i.catalog.title.to_lowercase()).collect();
        let mut sorted = titles.clone();
        sorted.sort();
        assert_eq!(titles, sorted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced() {
        let fetcher = seeded_fetcher();
        let session = session(&fetcher);
        session.start("all").await;
        session.controller().wait_until_idle().await;

        session.type_search("f");
        session.type_search("fr");
        session.type_search("frieren");
        assert_eq!(session.filter().search_term(), "");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(session.filter().search_term(), "frieren");
        assert!(session
            .visible_items()
            .iter()
            .all(|item| item.catalog.title.to_lowercase().contains("frieren")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_filter_cancels_pending_search() {
        let fetcher = seeded_fetcher();
        let session = session(&fetcher);

        session.type_search("frieren");
        session.set_filter(FilterSpecification::default().with_search("mushishi"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(session.filter().search_term(), "mushishi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_preset_cancels_pending_search() {
        let favorites = FilterSpecification::default()
            .with_status(crate::filter::StatusFilter::includes([WatchStatus::Completed]));
        let persistence = Arc::new(MockPresetPersistence::with_presets(vec![
            fixtures::preset("p1", "Favorites", favorites.clone()),
        ]));
        let session = ListSession::new(
            seeded_fetcher() as Arc<dyn ListFetcher>,
            Arc::new(MockMutationClient::new()),
            persistence as Arc<dyn PresetPersistence>,
            SessionOptions {
                search_debounce: Duration::from_millis(200),
                ..Default::default()
            },
        );
        session.presets().load().await;

        session.type_search("bebop");
        let spec = session.apply_preset("p1").unwrap();
        assert_eq!(spec, favorites);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(session.filter(), favorites);
        assert_eq!(session.filter().search_term(), "");
        assert_eq!(session.presets().selected_id().as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_unknown_quick_filter() {
        let fetcher = seeded_fetcher();
        let session = session(&fetcher);
        assert!(session.toggle_quick_filter("nope").is_none());
        assert!(session.filter().is_default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_filter_detaches_preset() {
        let fetcher = seeded_fetcher();
        let session = session(&fetcher);
        session
            .presets()
            .save(
                "Done",
                None,
                FilterSpecification::default().with_search("x"),
            )
            .await
            .unwrap();
        assert!(session.presets().selected_id().is_some());

        session.toggle_quick_filter("anime_only").unwrap();
        assert!(session.presets().selected_id().is_none());
    }
}
