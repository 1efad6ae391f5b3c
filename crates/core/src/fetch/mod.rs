//! List data fetching.
//!
//! [`ListDataController`] owns the fetched collection for each
//! [`FetchKey`] and guarantees that only the newest, uncancelled response
//! for the active key ever reaches the view. Data comes from a
//! [`ListFetcher`].

mod controller;
mod fetcher;
mod types;

pub use controller::{ListDataController, DEFAULT_FETCH_TIMEOUT};
pub use fetcher::ListFetcher;
pub use types::{FetchError, FetchKey, FetchPhase, ListSnapshot};
