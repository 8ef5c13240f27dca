// ── Server-side search & pagination controller ──
//
// Debounced, cancellable query pipeline over per-building device lists.
// Cancellation is modeled as explicit counter comparison at two levels:
//
//   - keystroke epoch: each input bumps the building's epoch; a debounce
//     timer that wakes to find a newer epoch does nothing.
//   - load generation: each issued fetch registers a generation with the
//     store; a response landing after a newer fetch was issued is
//     discarded (stale-response suppression), never applied.
//
// Client-side filtering (no network) lives in the building selector.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::notice::Notice;
use crate::store::EntityStore;

/// Per-building search/pagination state.
#[derive(Debug, Default)]
struct Session {
    /// Keystroke epoch for debounce supersession.
    epoch: u64,
    /// Current query string (already trimmed).
    query: String,
    /// Offset of the next page to fetch.
    offset: usize,
    /// A short page was received; no further pages exist.
    terminal: bool,
    /// Generation of the outstanding fetch, if any.
    in_flight: Option<u64>,
}

/// Debounced search and pagination over device lists.
///
/// Cheaply cloneable; debounce timers run on spawned tasks holding a
/// clone.
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<SearchInner>,
}

struct SearchInner {
    store: Arc<EntityStore>,
    gateway: Arc<dyn Gateway>,
    notices: broadcast::Sender<Notice>,
    page_size: usize,
    debounce: Duration,
    sessions: DashMap<u64, Session>,
}

impl SearchController {
    pub(crate) fn new(
        store: Arc<EntityStore>,
        gateway: Arc<dyn Gateway>,
        notices: broadcast::Sender<Notice>,
        page_size: usize,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SearchInner {
                store,
                gateway,
                notices,
                page_size,
                debounce,
                sessions: DashMap::new(),
            }),
        }
    }

    /// Load the first page for a building with its current query
    /// (initial expand, or reload after a bulk action).
    pub async fn open(&self, building_id: u64) -> Result<usize, CoreError> {
        self.fetch(building_id, false).await
    }

    /// Record a keystroke and restart the quiet-period timer.
    ///
    /// Only the fetch issued after the timer fires uninterrupted is
    /// applied; earlier keystrokes' timers wake, observe a newer epoch,
    /// and do nothing.
    pub fn input(&self, building_id: u64, text: &str) {
        let epoch = {
            let mut session = self.inner.sessions.entry(building_id).or_default();
            session.epoch += 1;
            session.query = text.trim().to_owned();
            session.epoch
        };

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.inner.debounce).await;

            let current = this.inner.sessions.get(&building_id).map(|s| s.epoch);
            if current != Some(epoch) {
                debug!(building_id, epoch, "debounce superseded, dropping");
                return;
            }

            if let Err(err) = this.fetch(building_id, false).await {
                warn!(building_id, error = %err, "debounced search failed");
                let _ = this.inner.notices.send(Notice::error(err.to_string()));
            }
        });
    }

    /// Set the query and fetch immediately, bypassing the quiet period.
    /// For single-shot consumers (CLI); interactive input goes through
    /// [`input()`](Self::input). Any pending debounce is superseded.
    pub async fn search(&self, building_id: u64, text: &str) -> Result<usize, CoreError> {
        {
            let mut session = self.inner.sessions.entry(building_id).or_default();
            session.epoch += 1;
            session.query = text.trim().to_owned();
        }
        self.fetch(building_id, false).await
    }

    /// Fetch the next page and append it. Returns the number of devices
    /// appended; 0 when the list was already terminal.
    pub async fn load_more(&self, building_id: u64) -> Result<usize, CoreError> {
        if self
            .inner
            .sessions
            .get(&building_id)
            .is_some_and(|s| s.terminal)
        {
            return Ok(0);
        }
        self.fetch(building_id, true).await
    }

    /// Whether more pages may exist for a building.
    pub fn has_more(&self, building_id: u64) -> bool {
        !self
            .inner
            .sessions
            .get(&building_id)
            .is_some_and(|s| s.terminal)
    }

    /// The building's current query string.
    pub fn query(&self, building_id: u64) -> String {
        self.inner
            .sessions
            .get(&building_id)
            .map(|s| s.query.clone())
            .unwrap_or_default()
    }

    /// Reset a building's search state to initial values (selection
    /// change). Pending debounce timers and in-flight fetches are
    /// logically cancelled.
    pub fn reset(&self, building_id: u64) {
        let mut session = self.inner.sessions.entry(building_id).or_default();
        session.epoch += 1;
        session.query.clear();
        session.offset = 0;
        session.terminal = false;
        session.in_flight = None;
        // Invalidate any outstanding response for this building.
        self.inner.store.begin_device_load(building_id);
    }

    // ── Fetch pipeline ───────────────────────────────────────────────

    /// Issue one paginated fetch. `append` pages forward; otherwise the
    /// list restarts at offset 0 and is replaced.
    async fn fetch(&self, building_id: u64, append: bool) -> Result<usize, CoreError> {
        let inner = &self.inner;

        // Causal ordering: never fetch devices for a building the store
        // doesn't know.
        if inner.store.building(building_id).is_none() {
            return Err(CoreError::BuildingNotFound { building_id });
        }

        let (query, offset, generation) = {
            let mut session = inner.sessions.entry(building_id).or_default();
            if append && session.in_flight.is_some() {
                return Err(CoreError::LoadInFlight { building_id });
            }
            let offset = if append { session.offset } else { 0 };
            let generation = inner.store.begin_device_load(building_id);
            session.in_flight = Some(generation);
            (session.query.clone(), offset, generation)
        };

        let result = inner
            .gateway
            .list_devices(building_id, inner.page_size, offset, &query)
            .await;

        let mut session = inner.sessions.entry(building_id).or_default();
        if session.in_flight == Some(generation) {
            session.in_flight = None;
        }

        let devices = result?; // failure leaves the prior list untouched

        let count = devices.len();
        if inner
            .store
            .apply_device_load(building_id, generation, devices, append)
        {
            session.offset = offset + count;
            session.terminal = count < inner.page_size;
        } else {
            debug!(building_id, generation, "stale search response suppressed");
        }
        Ok(count)
    }
}
