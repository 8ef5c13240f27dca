// ── Generation-guarded device collection ──
//
// One per building. Holds the building's device list as an ordered,
// reactive snapshot, plus the load-generation counter that enforces
// stale-response suppression: a list response is applied only if no
// newer load has been issued since it left.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::model::Device;

pub(crate) struct DeviceCollection {
    /// Load-generation counter. Bumped when a load is issued, compared
    /// when its response arrives; responses apply in generation order,
    /// not completion order.
    generation: AtomicU64,

    /// Ordered snapshot, broadcast to subscribers on every mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<Device>>>>,
}

impl DeviceCollection {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            generation: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Register a new load, returning its generation. Any response
    /// carrying an older generation is discarded on arrival.
    pub(crate) fn begin_load(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a load response. Returns `false` (leaving the list
    /// untouched) if `generation` is no longer current.
    ///
    /// `append` extends the existing list ("load more"); otherwise the
    /// list is replaced wholesale.
    pub(crate) fn apply_load(
        &self,
        generation: u64,
        devices: Vec<Device>,
        append: bool,
    ) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding stale device load");
            return false;
        }

        let incoming: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();
        self.snapshot.send_modify(|snap| {
            if append {
                let mut merged = Vec::with_capacity(snap.len() + incoming.len());
                merged.extend(snap.iter().cloned());
                merged.extend(incoming.iter().cloned());
                *snap = Arc::new(merged);
            } else {
                *snap = Arc::new(incoming.clone());
            }
        });
        true
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Device>>>> {
        self.snapshot.subscribe()
    }

    /// Look up a device by ID in the current snapshot.
    pub(crate) fn get(&self, device_id: u64) -> Option<Arc<Device>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
    }

    /// Patch a single device in place. Returns `false` if the device is
    /// not in the current list.
    pub(crate) fn patch(&self, device_id: u64, patch: impl FnOnce(&mut Device)) -> bool {
        let mut found = false;
        self.snapshot.send_if_modified(|snap| {
            let Some(idx) = snap.iter().position(|d| d.id == device_id) else {
                return false;
            };
            found = true;

            let mut devices: Vec<Arc<Device>> = snap.iter().cloned().collect();
            let mut updated = (*devices[idx]).clone();
            patch(&mut updated);
            devices[idx] = Arc::new(updated);
            *snap = Arc::new(devices);
            true
        });
        found
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ArmState;

    fn device(id: u64) -> Device {
        Device {
            id,
            name: format!("device-{id}"),
            state: ArmState::Disarmed,
            ignored_on_arm: false,
            ignored_on_disarm: false,
        }
    }

    #[test]
    fn apply_load_replaces_at_current_generation() {
        let col = DeviceCollection::new();
        let generation = col.begin_load();
        assert!(col.apply_load(generation, vec![device(1), device(2)], false));
        assert_eq!(col.snapshot().len(), 2);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let col = DeviceCollection::new();
        let g1 = col.begin_load();
        let g2 = col.begin_load();

        // g2's response lands first.
        assert!(col.apply_load(g2, vec![device(10)], false));
        // g1 arrives late and must be a no-op.
        assert!(!col.apply_load(g1, vec![device(1), device(2)], false));

        let snap = col.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, 10);
    }

    #[test]
    fn append_extends_without_clearing() {
        let col = DeviceCollection::new();
        let g1 = col.begin_load();
        col.apply_load(g1, vec![device(1)], false);

        let g2 = col.begin_load();
        col.apply_load(g2, vec![device(2)], true);

        let snap = col.snapshot();
        assert_eq!(snap.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn patch_updates_one_device_in_place() {
        let col = DeviceCollection::new();
        let generation = col.begin_load();
        col.apply_load(generation, vec![device(1), device(2)], false);

        assert!(col.patch(2, |d| d.state = ArmState::Armed));
        assert_eq!(col.get(2).unwrap().state, ArmState::Armed);
        assert_eq!(col.get(1).unwrap().state, ArmState::Disarmed);

        assert!(!col.patch(99, |d| d.state = ArmState::Armed));
    }
}
