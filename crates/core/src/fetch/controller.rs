//! Per-key fetch lifecycle.
//!
//! Each key moves through `idle -> fetching -> settled | cancelled | failed`.
//! At most one fetch is in flight per key. Switching keys cancels the
//! previous key's fetch, and every response is checked against its
//! cancellation token and sequence number before it may touch the view.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{FetchError, FetchKey, FetchPhase, ListFetcher, ListSnapshot};
use crate::item::{sanitize_records, RawTrackedItem, TrackedItem};
use crate::metrics;

/// Default bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct InFlight {
    sequence: u64,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct RequestState {
    phase: FetchPhase,
    in_flight: Option<InFlight>,
    last_completed_sequence: u64,
    items: Vec<TrackedItem>,
    error: Option<String>,
    fetched_at: Option<chrono::DateTime<Utc>>,
}

impl RequestState {
    fn snapshot(&self, key: &FetchKey) -> ListSnapshot {
        ListSnapshot {
            key: Some(key.clone()),
            phase: self.phase,
            items: self.items.clone(),
            error: self.error.clone(),
            sequence: self.last_completed_sequence,
            fetched_at: self.fetched_at,
        }
    }

    /// Abort the in-flight fetch, if any. Returns whether one was aborted.
    fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.token.cancel();
                self.phase = FetchPhase::Cancelled;
                metrics::FETCH_OUTCOMES
                    .with_label_values(&["cancelled"])
                    .inc();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    active_key: Option<FetchKey>,
    mounted: bool,
    requests: HashMap<FetchKey, RequestState>,
}

impl ControllerState {
    fn active_snapshot(&self) -> ListSnapshot {
        match &self.active_key {
            Some(key) => self
                .requests
                .get(key)
                .map(|request| request.snapshot(key))
                .unwrap_or_else(|| ListSnapshot {
                    key: Some(key.clone()),
                    ..Default::default()
                }),
            None => ListSnapshot::default(),
        }
    }
}

struct ControllerInner {
    fetcher: Arc<dyn ListFetcher>,
    fetch_timeout: Duration,
    sequence: AtomicU64,
    state: Mutex<ControllerState>,
    snapshot_tx: watch::Sender<ListSnapshot>,
}

impl ControllerInner {
    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: &ControllerState) {
        self.snapshot_tx.send_replace(state.active_snapshot());
    }

    /// Apply a finished fetch, unless it was cancelled or superseded.
    fn settle(
        &self,
        key: &FetchKey,
        sequence: u64,
        token: &CancellationToken,
        result: Result<Vec<RawTrackedItem>, FetchError>,
        elapsed: Duration,
    ) {
        let mut state = self.state();
        let is_active = state.active_key.as_ref() == Some(key);
        let Some(request) = state.requests.get_mut(key) else {
            return;
        };

        let is_current = request
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.sequence == sequence);

        if token.is_cancelled() || sequence <= request.last_completed_sequence || !is_current {
            debug!(
                key = %key,
                sequence,
                last_completed = request.last_completed_sequence,
                "Discarding stale fetch response"
            );
            metrics::FETCH_OUTCOMES
                .with_label_values(&["discarded"])
                .inc();
            return;
        }

        request.in_flight = None;

        match result {
            Ok(raw) => {
                let received = raw.len();
                request.items = sanitize_records(raw);
                request.last_completed_sequence = sequence;
                request.phase = FetchPhase::Settled;
                request.error = None;
                request.fetched_at = Some(Utc::now());

                metrics::FETCH_OUTCOMES.with_label_values(&["success"]).inc();
                metrics::FETCH_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed.as_secs_f64());
                debug!(
                    key = %key,
                    sequence,
                    received,
                    kept = request.items.len(),
                    "Fetch settled"
                );
            }
            Err(FetchError::Cancelled) => {
                request.phase = FetchPhase::Cancelled;
                metrics::FETCH_OUTCOMES
                    .with_label_values(&["cancelled"])
                    .inc();
                debug!(key = %key, sequence, "Fetch cancelled by collaborator");
            }
            Err(e) => {
                request.phase = FetchPhase::Failed;
                request.error = Some(e.to_string());

                metrics::FETCH_OUTCOMES.with_label_values(&[e.outcome()]).inc();
                metrics::FETCH_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed.as_secs_f64());
                warn!("Fetch for {} failed: {}", key, e);
            }
        }

        if is_active {
            self.publish(&state);
        }
    }
}

/// Owns fetched collections and their request lifecycle.
///
/// Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct ListDataController {
    inner: Arc<ControllerInner>,
}

impl ListDataController {
    pub fn new(fetcher: Arc<dyn ListFetcher>, fetch_timeout: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(ListSnapshot::default());
        Self {
            inner: Arc::new(ControllerInner {
                fetcher,
                fetch_timeout,
                sequence: AtomicU64::new(0),
                state: Mutex::new(ControllerState::default()),
                snapshot_tx,
            }),
        }
    }

    /// Make `key` the active key.
    ///
    /// Fetches for other keys are cancelled. A fetch for `key` starts unless
    /// one is already in flight. Returns whether a fetch started.
    pub fn activate(&self, key: impl Into<FetchKey>) -> bool {
        let key = key.into();
        let mut state = self.inner.state();
        state.mounted = true;

        for (other, request) in state.requests.iter_mut() {
            if *other != key && request.cancel() {
                debug!(key = %other, "Cancelled fetch for inactive key");
            }
        }

        if state.active_key.as_ref() != Some(&key) {
            info!(key = %key, "Activating list key");
        }
        state.active_key = Some(key.clone());

        let started = self.start_fetch(&mut state, &key);
        self.inner.publish(&state);
        started
    }

    /// Re-fetch the active key. No-op while a fetch for it is in flight or
    /// after [`unmount`](Self::unmount).
    pub fn refetch(&self) -> bool {
        let mut state = self.inner.state();
        if !state.mounted {
            return false;
        }
        let Some(key) = state.active_key.clone() else {
            return false;
        };

        let started = self.start_fetch(&mut state, &key);
        if started {
            self.inner.publish(&state);
        } else {
            debug!(key = %key, "Refetch skipped, fetch already in flight");
        }
        started
    }

    /// Re-fetch only if no fetch is in flight for the active key.
    pub fn refetch_if_idle(&self) -> bool {
        self.is_idle() && self.refetch()
    }

    /// Cancel every outstanding fetch. Late responses are discarded.
    pub fn unmount(&self) {
        let mut state = self.inner.state();
        state.mounted = false;

        let mut cancelled = 0;
        for request in state.requests.values_mut() {
            if request.cancel() {
                cancelled += 1;
            }
        }
        info!(cancelled, "List controller unmounted");
        self.inner.publish(&state);
    }

    pub fn active_key(&self) -> Option<FetchKey> {
        self.inner.state().active_key.clone()
    }

    /// Whether the active key has no fetch in flight.
    pub fn is_idle(&self) -> bool {
        let state = self.inner.state();
        match &state.active_key {
            Some(key) => state
                .requests
                .get(key)
                .is_none_or(|request| request.in_flight.is_none()),
            None => true,
        }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.inner.state().active_snapshot()
    }

    pub fn snapshot_for(&self, key: &FetchKey) -> Option<ListSnapshot> {
        self.inner
            .state()
            .requests
            .get(key)
            .map(|request| request.snapshot(key))
    }

    /// Snapshots of the active key, published on every change.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Wait until the active key has no fetch in flight.
    pub async fn wait_until_idle(&self) -> ListSnapshot {
        let mut rx = self.subscribe();
        if self.is_idle() {
            return self.snapshot();
        }
        let snapshot = match rx.wait_for(|snapshot| !snapshot.phase.is_in_flight()).await {
            Ok(snapshot) => snapshot.clone(),
            // The sender lives as long as the controller
            Err(_) => self.snapshot(),
        };
        snapshot
    }

    fn start_fetch(&self, state: &mut ControllerState, key: &FetchKey) -> bool {
        let request = state.requests.entry(key.clone()).or_default();
        if request.in_flight.is_some() {
            debug!(key = %key, "Fetch already in flight, not starting another");
            return false;
        }

        let sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        request.in_flight = Some(InFlight {
            sequence,
            token: token.clone(),
        });
        request.phase = FetchPhase::Fetching;
        request.error = None;

        metrics::FETCHES_STARTED.inc();
        debug!(key = %key, sequence, "Starting fetch");

        self.spawn_fetch(key.clone(), sequence, token);
        true
    }

    fn spawn_fetch(&self, key: FetchKey, sequence: u64, token: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let started = Instant::now();
            let result = if token.is_cancelled() {
                Err(FetchError::Cancelled)
            } else {
                match tokio::time::timeout(
                    inner.fetch_timeout,
                    inner.fetcher.fetch(&key, token.clone()),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(inner.fetch_timeout)),
                }
            };
            inner.settle(&key, sequence, &token, result, started.elapsed());
        });
    }
}
