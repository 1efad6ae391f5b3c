//! Mock list fetcher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchError, FetchKey, ListFetcher};
use crate::item::RawTrackedItem;

/// A recorded fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    pub key: FetchKey,
    /// Whether the token was already cancelled when the call was made.
    pub cancelled_on_entry: bool,
}

struct QueuedResponse {
    delay: Duration,
    result: Result<Vec<RawTrackedItem>, FetchError>,
}

/// Mock implementation of the ListFetcher trait.
///
/// Provides controllable behavior for testing:
/// - Per-key item sets and response delays
/// - One-shot queued responses (errors, out-of-order arrivals)
/// - Recorded calls
///
/// Delays deliberately ignore the cancellation token, so a "slow" response
/// always arrives late. That is exactly the case the controller must discard.
///
/// # Example
///
/// ```rust,ignore
/// use shelfview_core::testing::MockListFetcher;
///
/// let fetcher = MockListFetcher::new();
/// fetcher.set_items("watching", vec![/* raw records */]);
/// fetcher.set_delay("watching", Duration::from_millis(200));
/// fetcher.push_response("completed", Duration::ZERO, Err(FetchError::Network("down".into())));
/// ```
#[derive(Default)]
pub struct MockListFetcher {
    items: Mutex<HashMap<FetchKey, Vec<RawTrackedItem>>>,
    delays: Mutex<HashMap<FetchKey, Duration>>,
    queued: Mutex<HashMap<FetchKey, VecDeque<QueuedResponse>>>,
    calls: Mutex<Vec<RecordedFetch>>,
}

impl std::fmt::Debug for MockListFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockListFetcher")
            .field("calls", &self.calls.lock().unwrap().len())
            .finish()
    }
}

impl MockListFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items returned for `key` when no queued response is pending.
    pub fn set_items(&self, key: impl Into<FetchKey>, items: Vec<RawTrackedItem>) {
        self.items.lock().unwrap().insert(key.into(), items);
    }

    /// Delay applied to default responses for `key`.
    pub fn set_delay(&self, key: impl Into<FetchKey>, delay: Duration) {
        self.delays.lock().unwrap().insert(key.into(), delay);
    }

    /// Queue a one-shot response for the next call on `key`.
    pub fn push_response(
        &self,
        key: impl Into<FetchKey>,
        delay: Duration,
        result: Result<Vec<RawTrackedItem>, FetchError>,
    ) {
        self.queued
            .lock()
            .unwrap()
            .entry(key.into())
            .or_default()
            .push_back(QueuedResponse { delay, result });
    }

    pub fn calls(&self) -> Vec<RecordedFetch> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, key: impl Into<FetchKey>) -> usize {
        let key = key.into();
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.key == key)
            .count()
    }

    fn next_response(&self, key: &FetchKey) -> QueuedResponse {
        if let Some(queued) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(VecDeque::pop_front)
        {
            return queued;
        }
        QueuedResponse {
            delay: self
                .delays
                .lock()
                .unwrap()
                .get(key)
                .copied()
                .unwrap_or_default(),
            result: Ok(self
                .items
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .unwrap_or_default()),
        }
    }
}

#[async_trait]
impl ListFetcher for MockListFetcher {
    async fn fetch(
        &self,
        key: &FetchKey,
        cancel: CancellationToken,
    ) -> Result<Vec<RawTrackedItem>, FetchError> {
        self.calls.lock().unwrap().push(RecordedFetch {
            key: key.clone(),
            cancelled_on_entry: cancel.is_cancelled(),
        });

        let response = self.next_response(key);
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.result
    }
}
