// ── Central reactive entity store ──
//
// The single source of truth for the UI layer: buildings, per-building
// device lists, and the panel singleton. Mutations are broadcast to
// subscribers via `watch` channels. Only the store itself and the
// mutation coordinator write here; every other component reads.

mod collection;

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::one::Ref;
use tokio::sync::watch;

use collection::DeviceCollection;

use crate::aggregate::{AggregateStatus, aggregate};
use crate::model::{ArmState, Building, Device, Panel, Schedule};
use crate::stream::EntityStream;

/// Central reactive store for the console's entities.
///
/// Device collections are per-building: concurrent loads for different
/// buildings never interfere, and each building carries its own
/// load-generation counter for stale-response suppression.
pub struct EntityStore {
    buildings: watch::Sender<Arc<Vec<Arc<Building>>>>,
    devices: DashMap<u64, DeviceCollection>,
    panel: watch::Sender<Option<Panel>>,
}

impl EntityStore {
    pub fn new() -> Self {
        let (buildings, _) = watch::channel(Arc::new(Vec::new()));
        let (panel, _) = watch::channel(None);

        Self {
            buildings,
            devices: DashMap::new(),
            panel,
        }
    }

    // ── Buildings ────────────────────────────────────────────────────

    /// Replace the building list wholesale, preserving server order.
    pub fn replace_buildings(&self, buildings: Vec<Building>) {
        let buildings: Vec<Arc<Building>> = buildings.into_iter().map(Arc::new).collect();
        self.buildings.send_modify(|snap| *snap = Arc::new(buildings));
    }

    pub fn buildings_snapshot(&self) -> Arc<Vec<Arc<Building>>> {
        self.buildings.borrow().clone()
    }

    pub fn subscribe_buildings(&self) -> EntityStream<Building> {
        EntityStream::new(self.buildings.subscribe())
    }

    pub fn building(&self, building_id: u64) -> Option<Arc<Building>> {
        self.buildings
            .borrow()
            .iter()
            .find(|b| b.id == building_id)
            .cloned()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.borrow().len()
    }

    /// Patch a building's schedule after a successful save. Returns
    /// `false` if the building is unknown.
    pub(crate) fn set_building_schedule(&self, building_id: u64, schedule: Schedule) -> bool {
        let mut found = false;
        self.buildings.send_if_modified(|snap| {
            let Some(idx) = snap.iter().position(|b| b.id == building_id) else {
                return false;
            };
            found = true;

            let mut buildings: Vec<Arc<Building>> = snap.iter().cloned().collect();
            let mut updated = (*buildings[idx]).clone();
            updated.schedule = schedule;
            buildings[idx] = Arc::new(updated);
            *snap = Arc::new(buildings);
            true
        });
        found
    }

    // ── Devices ──────────────────────────────────────────────────────

    fn collection(&self, building_id: u64) -> Ref<'_, u64, DeviceCollection> {
        self.devices
            .entry(building_id)
            .or_insert_with(DeviceCollection::new)
            .downgrade()
    }

    /// Register a device load for a building, returning its generation.
    pub(crate) fn begin_device_load(&self, building_id: u64) -> u64 {
        self.collection(building_id).begin_load()
    }

    /// Apply a device-load response at `generation`. A stale generation
    /// leaves the list untouched and returns `false`.
    pub(crate) fn apply_device_load(
        &self,
        building_id: u64,
        generation: u64,
        devices: Vec<Device>,
        append: bool,
    ) -> bool {
        self.collection(building_id)
            .apply_load(generation, devices, append)
    }

    pub fn devices_snapshot(&self, building_id: u64) -> Arc<Vec<Arc<Device>>> {
        self.devices
            .get(&building_id)
            .map_or_else(|| Arc::new(Vec::new()), |c| c.snapshot())
    }

    pub fn subscribe_devices(&self, building_id: u64) -> EntityStream<Device> {
        EntityStream::new(self.collection(building_id).subscribe())
    }

    pub fn device(&self, building_id: u64, device_id: u64) -> Option<Arc<Device>> {
        self.devices.get(&building_id)?.get(device_id)
    }

    /// Patch a single device's arm state (optimistic apply, reconcile,
    /// or rollback). Returns `false` if the device is not loaded.
    pub(crate) fn set_device_state(
        &self,
        building_id: u64,
        device_id: u64,
        state: ArmState,
    ) -> bool {
        self.devices
            .get(&building_id)
            .is_some_and(|c| c.patch(device_id, |d| d.state = state))
    }

    /// Patch a single device's ignore flags.
    pub(crate) fn set_device_flags(
        &self,
        building_id: u64,
        device_id: u64,
        ignored_on_arm: bool,
        ignored_on_disarm: bool,
    ) -> bool {
        self.devices.get(&building_id).is_some_and(|c| {
            c.patch(device_id, |d| {
                d.ignored_on_arm = ignored_on_arm;
                d.ignored_on_disarm = ignored_on_disarm;
            })
        })
    }

    // ── Aggregate status ─────────────────────────────────────────────

    /// Derive a building's aggregate arm status from its current device
    /// list. Pure over the snapshot; subscribers recompute on change.
    pub fn aggregate_status(&self, building_id: u64) -> AggregateStatus {
        aggregate(&self.devices_snapshot(building_id))
    }

    // ── Panel ────────────────────────────────────────────────────────

    pub fn panel(&self) -> Option<Panel> {
        *self.panel.borrow()
    }

    pub(crate) fn set_panel(&self, armed: bool) {
        self.panel.send_modify(|p| *p = Some(Panel { armed }));
    }

    pub fn subscribe_panel(&self) -> watch::Receiver<Option<Panel>> {
        self.panel.subscribe()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ArmState;
    use chrono::NaiveTime;

    fn building(id: u64, name: &str) -> Building {
        Building {
            id,
            name: name.into(),
            schedule: Schedule::Window {
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            },
        }
    }

    fn device(id: u64, state: ArmState) -> Device {
        Device {
            id,
            name: format!("device-{id}"),
            state,
            ignored_on_arm: false,
            ignored_on_disarm: false,
        }
    }

    #[test]
    fn replace_buildings_is_wholesale_and_ordered() {
        let store = EntityStore::new();
        store.replace_buildings(vec![building(2, "B"), building(1, "A")]);

        let snap = store.buildings_snapshot();
        assert_eq!(snap.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 1]);

        store.replace_buildings(vec![building(3, "C")]);
        assert_eq!(store.building_count(), 1);
        assert!(store.building(1).is_none());
    }

    #[test]
    fn device_loads_for_different_buildings_do_not_interfere() {
        let store = EntityStore::new();
        let g1 = store.begin_device_load(1);
        let g2 = store.begin_device_load(2);

        assert!(store.apply_device_load(1, g1, vec![device(10, ArmState::Armed)], false));
        assert!(store.apply_device_load(2, g2, vec![device(20, ArmState::Disarmed)], false));

        assert_eq!(store.devices_snapshot(1).len(), 1);
        assert_eq!(store.devices_snapshot(2).len(), 1);
        assert!(store.device(1, 20).is_none());
    }

    #[test]
    fn schedule_patch_applies_to_known_building_only() {
        let store = EntityStore::new();
        store.replace_buildings(vec![building(1, "A")]);

        let schedule = Schedule::Daily {
            time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
        };
        assert!(store.set_building_schedule(1, schedule));
        assert_eq!(store.building(1).unwrap().schedule, schedule);
        assert!(!store.set_building_schedule(9, schedule));
    }

    #[test]
    fn aggregate_tracks_device_mutations() {
        let store = EntityStore::new();
        let generation = store.begin_device_load(1);
        store.apply_device_load(
            1,
            generation,
            vec![device(1, ArmState::Armed), device(2, ArmState::Disarmed)],
            false,
        );
        assert_eq!(store.aggregate_status(1), AggregateStatus::PartiallyArmed);

        store.set_device_state(1, 2, ArmState::Armed);
        assert_eq!(store.aggregate_status(1), AggregateStatus::AllArmed);
    }

    #[test]
    fn aggregate_for_unloaded_building_is_empty() {
        let store = EntityStore::new();
        assert_eq!(store.aggregate_status(42), AggregateStatus::Empty);
    }
}
