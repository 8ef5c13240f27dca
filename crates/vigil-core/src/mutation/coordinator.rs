// ── Mutation coordinator ──
//
// Applies user actions optimistically, reconciles them against the
// authoritative per-item result, and rolls back on failure.
//
// Ordering guarantee: a per-entity in-flight registry serializes
// mutations -- a second mutation against an entity whose first is still
// Applying is rejected outright, never interleaved. This prevents
// last-write-wins corruption from out-of-order responses.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::gateway::{ActionOutcome, ActionStatus, Gateway, IgnoreFlagsUpdate};
use crate::model::{ArmAction, ArmState, Schedule, ScheduleDraft, ScheduleShape};
use crate::store::EntityStore;

use super::{
    ActionFailure, FlagSnapshot, Mutation, MutationKind, MutationOutcome, PendingMutation,
    Snapshot,
};

/// Identity of an entity for mutation serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EntityKey {
    Device(u64),
    Building(u64),
    Panel,
}

/// Coordinates optimistic writes against the entity store.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct MutationCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    store: Arc<EntityStore>,
    gateway: Arc<dyn Gateway>,
    schedule_shape: ScheduleShape,
    in_flight: DashMap<EntityKey, ()>,
}

impl MutationCoordinator {
    pub(crate) fn new(
        store: Arc<EntityStore>,
        gateway: Arc<dyn Gateway>,
        schedule_shape: ScheduleShape,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                store,
                gateway,
                schedule_shape,
                in_flight: DashMap::new(),
            }),
        }
    }

    /// Execute one mutation through the optimistic state machine.
    pub async fn execute(&self, mutation: Mutation) -> Result<MutationOutcome, CoreError> {
        match mutation {
            Mutation::Toggle {
                building_id,
                device_id,
            } => self.toggle(building_id, device_id).await,
            Mutation::BulkAction {
                building_id,
                targets,
                action,
            } => self.bulk_action(building_id, targets, action).await,
            Mutation::IgnoreEdit {
                building_id,
                device_id,
                ignore_on_arm,
                ignore_on_disarm,
            } => {
                self.ignore_edit(building_id, device_id, ignore_on_arm, ignore_on_disarm)
                    .await
            }
            Mutation::IgnoreEditBulk { items } => self.ignore_edit_bulk(items).await,
            Mutation::ScheduleEdit { building_id, draft } => {
                self.schedule_edit(building_id, draft).await
            }
            Mutation::PanelToggle => self.panel_toggle().await,
        }
    }

    // ── Single-device toggle ─────────────────────────────────────────

    async fn toggle(&self, building_id: u64, device_id: u64) -> Result<MutationOutcome, CoreError> {
        let inner = &self.inner;
        let device = inner
            .store
            .device(building_id, device_id)
            .ok_or(CoreError::DeviceNotFound { device_id })?;

        // Local validation happens before any request is sent; nothing
        // was applied, so there is nothing to roll back.
        let Some(action) = ArmAction::toggling(device.state) else {
            return Err(CoreError::validation(format!(
                "device {device_id} is in an unknown state and cannot be toggled"
            )));
        };

        let _guard = self.acquire(vec![EntityKey::Device(device_id)])?;

        let mut pending = PendingMutation::new(
            MutationKind::from(action),
            Snapshot::DeviceStates {
                building_id,
                states: vec![(device_id, device.state)],
            },
        );
        pending.mark_applying();
        inner
            .store
            .set_device_state(building_id, device_id, action.target_state());

        match inner.gateway.perform_action(&[device_id], action).await {
            Err(err) => {
                warn!(device_id, error = %err, "toggle failed, rolling back");
                pending.rollback(&inner.store);
                Err(err)
            }
            Ok(outcome) => Ok(self.reconcile(&mut pending, &[device_id], outcome)),
        }
    }

    // ── Bulk arm/disarm ──────────────────────────────────────────────

    async fn bulk_action(
        &self,
        building_id: u64,
        targets: Option<Vec<u64>>,
        action: ArmAction,
    ) -> Result<MutationOutcome, CoreError> {
        let inner = &self.inner;
        if inner.store.building(building_id).is_none() {
            return Err(CoreError::BuildingNotFound { building_id });
        }

        let devices = inner.store.devices_snapshot(building_id);
        let targets: Vec<u64> = match targets {
            Some(ids) => {
                for &id in &ids {
                    if !devices.iter().any(|d| d.id == id) {
                        return Err(CoreError::DeviceNotFound { device_id: id });
                    }
                }
                ids
            }
            // Whole building: the per-transition ignore flag excludes a
            // device from bulk state changes.
            None => devices
                .iter()
                .filter(|d| !d.is_ignored_for(action))
                .map(|d| d.id)
                .collect(),
        };

        if targets.is_empty() {
            return Err(CoreError::validation(format!(
                "no devices eligible to {action} in building {building_id}"
            )));
        }

        let _guard = self.acquire(targets.iter().map(|&id| EntityKey::Device(id)).collect())?;

        let states: Vec<(u64, ArmState)> = targets
            .iter()
            .filter_map(|&id| devices.iter().find(|d| d.id == id).map(|d| (id, d.state)))
            .collect();

        let mut pending = PendingMutation::new(
            MutationKind::from(action),
            Snapshot::DeviceStates {
                building_id,
                states,
            },
        );
        pending.mark_applying();
        for &id in &targets {
            inner
                .store
                .set_device_state(building_id, id, action.target_state());
        }

        match inner.gateway.perform_action(&targets, action).await {
            Err(err) => {
                warn!(building_id, error = %err, "bulk action failed, rolling back");
                pending.rollback(&inner.store);
                Err(err)
            }
            Ok(outcome) => Ok(self.reconcile(&mut pending, &targets, outcome)),
        }
    }

    /// Settle an action response against the optimistic apply: targets
    /// the authority confirmed keep the new state, everything else is
    /// restored from the snapshot. A mixed outcome is never escalated
    /// to a full rollback.
    fn reconcile(
        &self,
        pending: &mut PendingMutation,
        targets: &[u64],
        outcome: ActionOutcome,
    ) -> MutationOutcome {
        let store = &self.inner.store;

        // Authorities that omit per-item details on a clean result are
        // taken at their word; any reported failure demands details.
        let succeeded: HashSet<u64> = if outcome.details.is_empty() && outcome.failure_count == 0 {
            targets.iter().copied().collect()
        } else {
            outcome.succeeded_ids().collect()
        };

        for &id in targets {
            if !succeeded.contains(&id) {
                pending.restore_device(store, id);
            }
        }

        let failures: Vec<ActionFailure> = outcome
            .details
            .iter()
            .filter(|d| d.status == ActionStatus::Failure)
            .map(|d| ActionFailure {
                device_id: d.device_id,
                message: d
                    .message
                    .clone()
                    .unwrap_or_else(|| "action rejected".to_owned()),
            })
            .collect();

        pending.confirm();

        if outcome.failure_count == 0 && succeeded.len() == targets.len() {
            MutationOutcome::Confirmed
        } else {
            debug!(
                success = outcome.success_count,
                failure = outcome.failure_count,
                "bulk action partially applied"
            );
            MutationOutcome::Partial {
                success_count: outcome.success_count,
                failure_count: outcome.failure_count,
                failures,
            }
        }
    }

    // ── Ignore-flag edits ────────────────────────────────────────────

    async fn ignore_edit(
        &self,
        building_id: u64,
        device_id: u64,
        ignore_on_arm: bool,
        ignore_on_disarm: bool,
    ) -> Result<MutationOutcome, CoreError> {
        let inner = &self.inner;
        let device = inner
            .store
            .device(building_id, device_id)
            .ok_or(CoreError::DeviceNotFound { device_id })?;

        let _guard = self.acquire(vec![EntityKey::Device(device_id)])?;

        let mut pending = PendingMutation::new(
            MutationKind::IgnoreEdit,
            Snapshot::DeviceFlags {
                items: vec![FlagSnapshot {
                    building_id,
                    device_id,
                    ignored_on_arm: device.ignored_on_arm,
                    ignored_on_disarm: device.ignored_on_disarm,
                }],
            },
        );
        pending.mark_applying();
        inner
            .store
            .set_device_flags(building_id, device_id, ignore_on_arm, ignore_on_disarm);

        match inner
            .gateway
            .set_ignore_flags(device_id, ignore_on_arm, ignore_on_disarm)
            .await
        {
            Err(err) => {
                warn!(device_id, error = %err, "ignore edit failed, reverting flags");
                pending.rollback(&inner.store);
                Err(err)
            }
            Ok(()) => {
                // State already reflects the request; nothing to patch.
                pending.confirm();
                Ok(MutationOutcome::Confirmed)
            }
        }
    }

    async fn ignore_edit_bulk(
        &self,
        items: Vec<IgnoreFlagsUpdate>,
    ) -> Result<MutationOutcome, CoreError> {
        if items.is_empty() {
            return Err(CoreError::validation("no ignore edits given"));
        }

        let inner = &self.inner;
        let _guard = self.acquire(
            items
                .iter()
                .map(|i| EntityKey::Device(i.device_id))
                .collect(),
        )?;

        // Snapshot what is loaded; items for unloaded devices still go
        // in the request but have no local state to flip or restore.
        let snapshots: Vec<FlagSnapshot> = items
            .iter()
            .filter_map(|item| {
                inner
                    .store
                    .device(item.building_id, item.device_id)
                    .map(|d| FlagSnapshot {
                        building_id: item.building_id,
                        device_id: item.device_id,
                        ignored_on_arm: d.ignored_on_arm,
                        ignored_on_disarm: d.ignored_on_disarm,
                    })
            })
            .collect();

        let mut pending =
            PendingMutation::new(MutationKind::IgnoreEdit, Snapshot::DeviceFlags {
                items: snapshots,
            });
        pending.mark_applying();
        for item in &items {
            inner.store.set_device_flags(
                item.building_id,
                item.device_id,
                item.ignore_on_arm,
                item.ignore_on_disarm,
            );
        }

        match inner.gateway.set_ignore_flags_bulk(&items).await {
            Err(err) => {
                warn!(error = %err, "bulk ignore edit failed, reverting flags");
                pending.rollback(&inner.store);
                Err(err)
            }
            Ok(()) => {
                pending.confirm();
                Ok(MutationOutcome::Confirmed)
            }
        }
    }

    // ── Schedule edit ────────────────────────────────────────────────

    async fn schedule_edit(
        &self,
        building_id: u64,
        draft: ScheduleDraft,
    ) -> Result<MutationOutcome, CoreError> {
        let inner = &self.inner;
        if inner.store.building(building_id).is_none() {
            return Err(CoreError::BuildingNotFound { building_id });
        }

        // Validation failure aborts before the gateway is ever invoked.
        let schedule = validate_draft(inner.schedule_shape, draft)?;

        let _guard = self.acquire(vec![EntityKey::Building(building_id)])?;

        // Schedules are not applied speculatively: the building record
        // is patched only by a successful save response.
        let mut pending = PendingMutation::new(MutationKind::ScheduleEdit, Snapshot::None);
        pending.mark_applying();

        match inner
            .gateway
            .set_building_schedule(building_id, &schedule)
            .await
        {
            Err(err) => {
                pending.rollback(&inner.store);
                Err(err)
            }
            Ok(()) => {
                inner.store.set_building_schedule(building_id, schedule);
                pending.confirm();
                Ok(MutationOutcome::Confirmed)
            }
        }
    }

    // ── Panel toggle ─────────────────────────────────────────────────

    async fn panel_toggle(&self) -> Result<MutationOutcome, CoreError> {
        let inner = &self.inner;
        let panel = inner.store.panel().ok_or(CoreError::PanelUnavailable)?;

        let _guard = self.acquire(vec![EntityKey::Panel])?;

        let target = !panel.armed;
        let mut pending = PendingMutation::new(MutationKind::PanelToggle, Snapshot::Panel {
            armed: panel.armed,
        });
        pending.mark_applying();
        inner.store.set_panel(target);

        match inner.gateway.set_panel_status(target).await {
            Err(err) => {
                warn!(error = %err, "panel toggle failed, reverting");
                pending.rollback(&inner.store);
                Err(err)
            }
            Ok(()) => {
                pending.confirm();
                Ok(MutationOutcome::Confirmed)
            }
        }
    }

    // ── Per-entity serialization ─────────────────────────────────────

    /// Claim every key or none: a second mutation against a busy entity
    /// is rejected, never interleaved.
    fn acquire(&self, keys: Vec<EntityKey>) -> Result<InFlightGuard<'_>, CoreError> {
        let registry = &self.inner.in_flight;
        let mut held = Vec::with_capacity(keys.len());

        for key in keys {
            // The entry guard locks the key's shard; it must be dropped
            // before touching other keys that may share the shard.
            let claimed = match registry.entry(key) {
                dashmap::Entry::Occupied(_) => false,
                dashmap::Entry::Vacant(slot) => {
                    slot.insert(());
                    true
                }
            };
            if !claimed {
                for held_key in &held {
                    registry.remove(held_key);
                }
                return Err(CoreError::MutationInFlight);
            }
            held.push(key);
        }

        Ok(InFlightGuard {
            registry,
            keys: held,
        })
    }
}

/// Releases claimed entity keys when the mutation settles (or the
/// future is dropped).
struct InFlightGuard<'a> {
    registry: &'a DashMap<EntityKey, ()>,
    keys: Vec<EntityKey>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        for key in &self.keys {
            self.registry.remove(key);
        }
    }
}

// ── Draft validation ─────────────────────────────────────────────────

/// Check a schedule draft against the deployment's shape, producing the
/// value to send.
fn validate_draft(shape: ScheduleShape, draft: ScheduleDraft) -> Result<Schedule, CoreError> {
    match shape {
        ScheduleShape::Window => match (draft.start, draft.end) {
            (Some(start), Some(end)) => Ok(Schedule::Window { start, end }),
            _ => Err(CoreError::validation(
                "both start and end times are required",
            )),
        },
        ScheduleShape::Daily => draft
            .time
            .map(|time| Schedule::Daily { time })
            .ok_or_else(|| CoreError::validation("a schedule time is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn window_draft_requires_both_ends() {
        let start = NaiveTime::from_hms_opt(9, 0, 0);
        let draft = ScheduleDraft {
            start,
            end: None,
            time: None,
        };
        assert!(matches!(
            validate_draft(ScheduleShape::Window, draft),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn daily_draft_requires_time() {
        let draft = ScheduleDraft::default();
        assert!(matches!(
            validate_draft(ScheduleShape::Daily, draft),
            Err(CoreError::Validation { .. })
        ));

        let draft = ScheduleDraft {
            time: NaiveTime::from_hms_opt(6, 30, 0),
            ..ScheduleDraft::default()
        };
        assert!(matches!(
            validate_draft(ScheduleShape::Daily, draft),
            Ok(Schedule::Daily { .. })
        ));
    }
}
