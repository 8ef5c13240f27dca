// ── Mutation types ──
//
// Every write flows through one tagged `Mutation` value dispatched by
// the coordinator. Each execution is an explicit state machine:
//
//   Idle -> Applying(optimistic) -> { Confirmed | RolledBack }
//
// with a snapshot of the pre-mutation state held for rollback.

mod coordinator;

pub use coordinator::MutationCoordinator;

use crate::gateway::IgnoreFlagsUpdate;
use crate::model::{ArmAction, ArmState, ScheduleDraft};
use crate::store::EntityStore;

/// A user-initiated write, dispatched through the coordinator.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Toggle one device to the logical inverse of its current state.
    Toggle { building_id: u64, device_id: u64 },

    /// Arm or disarm a set of devices in one request. `targets: None`
    /// means the whole building, minus devices whose ignore flag for
    /// this transition is set.
    BulkAction {
        building_id: u64,
        targets: Option<Vec<u64>>,
        action: ArmAction,
    },

    /// Edit one device's ignore flags.
    IgnoreEdit {
        building_id: u64,
        device_id: u64,
        ignore_on_arm: bool,
        ignore_on_disarm: bool,
    },

    /// Edit ignore flags for several devices in one request.
    IgnoreEditBulk { items: Vec<IgnoreFlagsUpdate> },

    /// Save a building's schedule. Validated against the deployment's
    /// schedule shape before any request is sent; not optimistic.
    ScheduleEdit {
        building_id: u64,
        draft: ScheduleDraft,
    },

    /// Flip the session-wide panel arm flag.
    PanelToggle,
}

/// How a mutation resolved.
///
/// `Partial` is a first-class result, not an error: the successful
/// subset keeps its new state, failed targets were reverted, and both
/// counts plus per-item reasons are surfaced.
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    Confirmed,
    Partial {
        success_count: u32,
        failure_count: u32,
        failures: Vec<ActionFailure>,
    },
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// One failed target of a bulk action, with the authority's reason.
#[derive(Debug, Clone)]
pub struct ActionFailure {
    pub device_id: u64,
    pub message: String,
}

/// What a pending mutation is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Applying,
    Confirmed,
    RolledBack,
}

/// The kind of change a pending mutation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Arm,
    Disarm,
    IgnoreEdit,
    ScheduleEdit,
    PanelToggle,
}

impl From<ArmAction> for MutationKind {
    fn from(action: ArmAction) -> Self {
        match action {
            ArmAction::Arm => Self::Arm,
            ArmAction::Disarm => Self::Disarm,
        }
    }
}

// ── Pre-mutation snapshots ───────────────────────────────────────────

/// Pre-interaction ignore flags of one device.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlagSnapshot {
    pub building_id: u64,
    pub device_id: u64,
    pub ignored_on_arm: bool,
    pub ignored_on_disarm: bool,
}

/// The state captured before an optimistic apply, sufficient to undo it.
#[derive(Debug, Clone)]
pub(crate) enum Snapshot {
    /// Nothing was applied speculatively (schedule edits).
    None,
    /// Previous arm states of the targeted devices.
    DeviceStates {
        building_id: u64,
        states: Vec<(u64, ArmState)>,
    },
    /// Previous ignore flags of the targeted devices.
    DeviceFlags { items: Vec<FlagSnapshot> },
    /// Previous panel flag.
    Panel { armed: bool },
}

/// An in-flight mutation: its kind, its rollback snapshot, and where it
/// is in the `Idle -> Applying -> {Confirmed, RolledBack}` machine.
///
/// Exists only between optimistic apply and reconciliation; never
/// persisted.
#[derive(Debug)]
pub(crate) struct PendingMutation {
    pub kind: MutationKind,
    snapshot: Snapshot,
    phase: MutationPhase,
}

impl PendingMutation {
    pub(crate) fn new(kind: MutationKind, snapshot: Snapshot) -> Self {
        Self {
            kind,
            snapshot,
            phase: MutationPhase::Idle,
        }
    }

    /// Enter `Applying`; the caller performs the optimistic store writes.
    pub(crate) fn mark_applying(&mut self) {
        debug_assert_eq!(self.phase, MutationPhase::Idle);
        self.phase = MutationPhase::Applying;
    }

    /// Settle as confirmed. The store already reflects the reconciled
    /// result; nothing further to do.
    pub(crate) fn confirm(&mut self) {
        if self.phase == MutationPhase::Applying {
            self.phase = MutationPhase::Confirmed;
        }
    }

    /// Undo the optimistic apply, restoring the pre-mutation snapshot.
    ///
    /// Idempotent: only an `Applying` mutation rolls back; calling this
    /// again (or after confirm) is a no-op.
    pub(crate) fn rollback(&mut self, store: &EntityStore) {
        if self.phase != MutationPhase::Applying {
            return;
        }
        self.phase = MutationPhase::RolledBack;

        match &self.snapshot {
            Snapshot::None => {}
            Snapshot::DeviceStates {
                building_id,
                states,
            } => {
                for (device_id, state) in states {
                    store.set_device_state(*building_id, *device_id, *state);
                }
            }
            Snapshot::DeviceFlags { items } => {
                for item in items {
                    store.set_device_flags(
                        item.building_id,
                        item.device_id,
                        item.ignored_on_arm,
                        item.ignored_on_disarm,
                    );
                }
            }
            Snapshot::Panel { armed } => {
                store.set_panel(*armed);
            }
        }
    }

    /// Restore a single device's snapshot state (partial reconcile:
    /// the authority rejected this target while others succeeded).
    pub(crate) fn restore_device(&self, store: &EntityStore, device_id: u64) {
        if let Snapshot::DeviceStates {
            building_id,
            states,
        } = &self.snapshot
        {
            if let Some((_, state)) = states.iter().find(|(id, _)| *id == device_id) {
                store.set_device_state(*building_id, device_id, *state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Device;

    fn store_with_device(state: ArmState) -> EntityStore {
        let store = EntityStore::new();
        let generation = store.begin_device_load(1);
        store.apply_device_load(
            1,
            generation,
            vec![Device {
                id: 7,
                name: "Vault".into(),
                state,
                ignored_on_arm: false,
                ignored_on_disarm: false,
            }],
            false,
        );
        store
    }

    #[test]
    fn rollback_restores_snapshot_once() {
        let store = store_with_device(ArmState::Disarmed);
        let mut pending = PendingMutation::new(
            MutationKind::Arm,
            Snapshot::DeviceStates {
                building_id: 1,
                states: vec![(7, ArmState::Disarmed)],
            },
        );
        pending.mark_applying();
        store.set_device_state(1, 7, ArmState::Armed);

        pending.rollback(&store);
        assert_eq!(pending.phase, MutationPhase::RolledBack);
        assert_eq!(
            store.device(1, 7).expect("loaded").state,
            ArmState::Disarmed
        );

        // A second rollback is a no-op, even if the store moved on.
        store.set_device_state(1, 7, ArmState::Armed);
        pending.rollback(&store);
        assert_eq!(store.device(1, 7).expect("loaded").state, ArmState::Armed);
    }

    #[test]
    fn confirmed_mutation_never_rolls_back() {
        let store = store_with_device(ArmState::Disarmed);
        let mut pending = PendingMutation::new(
            MutationKind::Arm,
            Snapshot::DeviceStates {
                building_id: 1,
                states: vec![(7, ArmState::Disarmed)],
            },
        );
        pending.mark_applying();
        store.set_device_state(1, 7, ArmState::Armed);
        pending.confirm();

        pending.rollback(&store);
        assert_eq!(pending.phase, MutationPhase::Confirmed);
        assert_eq!(store.device(1, 7).expect("loaded").state, ArmState::Armed);
    }
}
