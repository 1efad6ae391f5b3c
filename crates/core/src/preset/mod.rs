//! Named, reusable filter specifications.
//!
//! [`PresetStore`] keeps the local preset list and the active specification.
//! Storage sits behind [`PresetPersistence`]: SQLite locally, or the remote
//! backend through [`crate::backend::HttpBackend`].

mod persistence;
mod sqlite;
mod store;
mod types;

pub use persistence::{PersistenceError, PresetPersistence};
pub use sqlite::SqlitePresetPersistence;
pub use store::{PresetError, PresetStore};
pub use types::{FilterPreset, NewPreset, RemoveConfirmation, RemoveOutcome};
