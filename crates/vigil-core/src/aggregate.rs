// ── Aggregate arm-status derivation ──
//
// Pure function over a building's device list. Recomputed after every
// device state or set-membership change; ignore-flag edits don't change
// arm state and therefore never change the aggregate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::model::Device;

/// A building's aggregate arm status, derived from its devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AggregateStatus {
    #[strum(serialize = "All Armed")]
    AllArmed,
    #[strum(serialize = "Partially Armed")]
    PartiallyArmed,
    #[strum(serialize = "All Disarmed")]
    AllDisarmed,
    #[strum(serialize = "No Devices")]
    Empty,
}

/// Compute the aggregate status of a device list.
///
/// `Empty` iff the list is empty; `AllArmed` iff every device is armed;
/// `AllDisarmed` iff none are; `PartiallyArmed` otherwise. `Unknown`
/// counts as not armed.
pub fn aggregate(devices: &[Arc<Device>]) -> AggregateStatus {
    if devices.is_empty() {
        return AggregateStatus::Empty;
    }

    let armed = devices.iter().filter(|d| d.state.is_armed()).count();

    if armed == devices.len() {
        AggregateStatus::AllArmed
    } else if armed == 0 {
        AggregateStatus::AllDisarmed
    } else {
        AggregateStatus::PartiallyArmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArmState;

    fn device(id: u64, state: ArmState) -> Arc<Device> {
        Arc::new(Device {
            id,
            name: format!("device-{id}"),
            state,
            ignored_on_arm: false,
            ignored_on_disarm: false,
        })
    }

    #[test]
    fn empty_list_is_empty() {
        assert_eq!(aggregate(&[]), AggregateStatus::Empty);
    }

    #[test]
    fn all_armed_requires_every_device_armed() {
        let devices = vec![device(1, ArmState::Armed), device(2, ArmState::Armed)];
        assert_eq!(aggregate(&devices), AggregateStatus::AllArmed);
    }

    #[test]
    fn no_armed_devices_is_all_disarmed() {
        let devices = vec![device(1, ArmState::Disarmed), device(2, ArmState::Disarmed)];
        assert_eq!(aggregate(&devices), AggregateStatus::AllDisarmed);
    }

    #[test]
    fn mixed_states_are_partial() {
        let devices = vec![device(1, ArmState::Armed), device(2, ArmState::Disarmed)];
        assert_eq!(aggregate(&devices), AggregateStatus::PartiallyArmed);
    }

    #[test]
    fn unknown_counts_as_not_armed() {
        // All-unknown is AllDisarmed, not AllArmed.
        let devices = vec![device(1, ArmState::Unknown), device(2, ArmState::Unknown)];
        assert_eq!(aggregate(&devices), AggregateStatus::AllDisarmed);

        // Armed + unknown is partial.
        let devices = vec![device(1, ArmState::Armed), device(2, ArmState::Unknown)];
        assert_eq!(aggregate(&devices), AggregateStatus::PartiallyArmed);
    }
}
