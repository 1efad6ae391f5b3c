pub mod backend;
pub mod bulk;
pub mod config;
pub mod debounce;
pub mod fetch;
pub mod filter;
pub mod item;
pub mod metrics;
pub mod preset;
pub mod session;
pub mod testing;

pub use backend::{BackendError, HttpBackend};
pub use bulk::{
    BulkError, BulkMutation, BulkMutationCoordinator, BulkOutcome, MutationClient, MutationError,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, PresetStoreKind,
    SanitizedConfig,
};
pub use fetch::{FetchError, FetchKey, FetchPhase, ListDataController, ListFetcher, ListSnapshot};
pub use filter::{
    apply_view, comparator_for, matches, FilterSpecification, QuickFilterCatalog, SortDirection,
    SortKey, SortOrder,
};
pub use item::{DataShapeError, ItemUpdate, RawTrackedItem, TrackedItem, WatchStatus};
pub use preset::{
    FilterPreset, PersistenceError, PresetError, PresetPersistence, PresetStore,
    RemoveConfirmation, RemoveOutcome, SqlitePresetPersistence,
};
pub use session::{ListSession, ListView, SessionOptions};
