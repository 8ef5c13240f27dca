// ── Console facade ──
//
// The main entry point for consumers. Ties the entity store, search
// controller, mutation coordinator, and building selector together
// behind one cheaply-cloneable handle.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::aggregate::AggregateStatus;
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{Building, Device, Panel};
use crate::mutation::{Mutation, MutationCoordinator, MutationOutcome};
use crate::notice::Notice;
use crate::search::SearchController;
use crate::selector::BuildingSelector;
use crate::store::EntityStore;
use crate::stream::EntityStream;

const NOTICE_CHANNEL_SIZE: usize = 64;

/// The client-side view-model over the panel service.
///
/// Reads flow one way (gateway -> store -> aggregate/render); writes
/// round-trip through the coordinator (intent -> optimistic store update
/// -> gateway -> reconciliation).
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    store: Arc<EntityStore>,
    gateway: Arc<dyn Gateway>,
    search: SearchController,
    coordinator: MutationCoordinator,
    selector: BuildingSelector,
    notices: broadcast::Sender<Notice>,
}

impl Console {
    /// Create a console over a gateway. Does not fetch anything --
    /// call [`connect()`](Self::connect) to load the initial snapshot.
    pub fn new(gateway: Arc<dyn Gateway>, config: ConsoleConfig) -> Self {
        let store = Arc::new(EntityStore::new());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);

        let search = SearchController::new(
            Arc::clone(&store),
            Arc::clone(&gateway),
            notices.clone(),
            config.page_size,
            config.debounce,
        );
        let coordinator = MutationCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&gateway),
            config.schedule_shape,
        );
        let selector = BuildingSelector::new(Arc::clone(&store));

        Self {
            inner: Arc::new(ConsoleInner {
                store,
                gateway,
                search,
                coordinator,
                selector,
                notices,
            }),
        }
    }

    /// Access the underlying entity store.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.inner.store
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Load the initial session snapshot: the building batch, then the
    /// panel flag. Device lists load lazily per building.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.refresh_buildings().await?;

        let armed = self.inner.gateway.panel_status().await?;
        self.inner.store.set_panel(armed);

        info!(
            buildings = self.inner.store.building_count(),
            "console connected"
        );
        Ok(())
    }

    /// Re-fetch the building batch, replacing the store's list
    /// wholesale. Device lists are untouched.
    pub async fn refresh_buildings(&self) -> Result<usize, CoreError> {
        let buildings = self.inner.gateway.list_buildings().await?;
        let count = buildings.len();
        self.inner.store.replace_buildings(buildings);
        debug!(count, "building list refreshed");
        Ok(count)
    }

    /// One-shot: connect, run closure, done. Optimized for the CLI's
    /// single request-response cycle.
    pub async fn oneshot<F, Fut, T>(
        gateway: Arc<dyn Gateway>,
        config: ConsoleConfig,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Console) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let console = Console::new(gateway, config);
        console.connect().await?;
        f(console).await
    }

    // ── Device loading / search ──────────────────────────────────────

    /// Load the first device page for a building (initial expand).
    pub async fn open_building(&self, building_id: u64) -> Result<usize, CoreError> {
        self.inner.search.open(building_id).await
    }

    /// Feed a search keystroke into the debounced pipeline.
    pub fn search_input(&self, building_id: u64, text: &str) {
        self.inner.search.input(building_id, text);
    }

    /// Set the query and search immediately, bypassing the quiet period
    /// (single-shot consumers).
    pub async fn search_devices(&self, building_id: u64, text: &str) -> Result<usize, CoreError> {
        self.inner.search.search(building_id, text).await
    }

    /// Re-run the current search from offset 0 (e.g. after a bulk
    /// action, mirroring the authority's post-action refresh).
    pub async fn refresh_devices(&self, building_id: u64) -> Result<usize, CoreError> {
        self.inner.search.open(building_id).await
    }

    /// Fetch and append the next device page.
    pub async fn load_more(&self, building_id: u64) -> Result<usize, CoreError> {
        self.inner.search.load_more(building_id).await
    }

    /// Whether more device pages may exist for a building.
    pub fn has_more_devices(&self, building_id: u64) -> bool {
        self.inner.search.has_more(building_id)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Execute a mutation through the coordinator.
    pub async fn execute(&self, mutation: Mutation) -> Result<MutationOutcome, CoreError> {
        self.inner.coordinator.execute(mutation).await
    }

    // ── Building selection ───────────────────────────────────────────

    /// Filter buildings by case-insensitive substring on name
    /// (client-side, no network). Empty query yields the full set.
    pub fn filter_buildings(&self, query: &str) -> Vec<Arc<Building>> {
        self.inner.selector.filter(query)
    }

    /// Select a building, narrowing device loads to it and resetting
    /// its search/pagination state to initial values.
    pub fn select_building(&self, building_id: u64) -> Result<Arc<Building>, CoreError> {
        let building = self.inner.selector.select(building_id)?;
        self.inner.search.reset(building_id);
        Ok(building)
    }

    /// Clear the building selection.
    pub fn clear_selection(&self) {
        self.inner.selector.clear();
    }

    pub fn selected_building(&self) -> Option<u64> {
        self.inner.selector.selected()
    }

    /// The currently visible buildings (the selection, or all).
    pub fn visible_buildings(&self) -> Vec<Arc<Building>> {
        self.inner.selector.visible()
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn buildings(&self) -> Arc<Vec<Arc<Building>>> {
        self.inner.store.buildings_snapshot()
    }

    pub fn devices(&self, building_id: u64) -> Arc<Vec<Arc<Device>>> {
        self.inner.store.devices_snapshot(building_id)
    }

    /// A building's aggregate arm status, derived from its current
    /// device list.
    pub fn building_status(&self, building_id: u64) -> AggregateStatus {
        self.inner.store.aggregate_status(building_id)
    }

    pub fn panel(&self) -> Option<Panel> {
        self.inner.store.panel()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_buildings(&self) -> EntityStream<Building> {
        self.inner.store.subscribe_buildings()
    }

    pub fn subscribe_devices(&self, building_id: u64) -> EntityStream<Device> {
        self.inner.store.subscribe_devices(building_id)
    }

    /// Subscribe to notices from background work (debounced fetches).
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }
}
