// ── Device domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A device's arm state.
///
/// Authoritative only from the gateway; the store may hold a pending
/// shadow value while a mutation is in flight. Anything the wire reports
/// outside `armed`/`disarmed` normalizes to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ArmState {
    Armed,
    Disarmed,
    Unknown,
}

impl ArmState {
    pub fn is_armed(self) -> bool {
        matches!(self, Self::Armed)
    }

    /// `true` for states a single-device toggle can act on.
    pub fn is_actionable(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// The two controllable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ArmAction {
    Arm,
    Disarm,
}

impl ArmAction {
    /// The state a device reaches when this action succeeds.
    pub fn target_state(self) -> ArmState {
        match self {
            Self::Arm => ArmState::Armed,
            Self::Disarm => ArmState::Disarmed,
        }
    }

    /// The action that toggles away from `state`, if the state is
    /// actionable.
    pub fn toggling(state: ArmState) -> Option<Self> {
        match state {
            ArmState::Armed => Some(Self::Disarm),
            ArmState::Disarmed => Some(Self::Arm),
            ArmState::Unknown => None,
        }
    }
}

/// The controllable unit (aka item/proevent) within a building.
///
/// Fetched per building, replaced wholesale on each list reload, fields
/// patched in place on successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: u64,
    pub name: String,
    pub state: ArmState,
    pub ignored_on_arm: bool,
    pub ignored_on_disarm: bool,
}

impl Device {
    /// `true` if this device is excluded from a bulk `action` by its
    /// per-transition ignore flag.
    pub fn is_ignored_for(&self, action: ArmAction) -> bool {
        match action {
            ArmAction::Arm => self.ignored_on_arm,
            ArmAction::Disarm => self.ignored_on_disarm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_state_parses_wire_strings() {
        assert_eq!("armed".parse::<ArmState>().ok(), Some(ArmState::Armed));
        assert_eq!("Disarmed".parse::<ArmState>().ok(), Some(ArmState::Disarmed));
        assert!("tamper".parse::<ArmState>().is_err());
    }

    #[test]
    fn toggling_inverts_actionable_states() {
        assert_eq!(ArmAction::toggling(ArmState::Armed), Some(ArmAction::Disarm));
        assert_eq!(ArmAction::toggling(ArmState::Disarmed), Some(ArmAction::Arm));
        assert_eq!(ArmAction::toggling(ArmState::Unknown), None);
    }

    #[test]
    fn ignore_flags_are_per_transition() {
        let device = Device {
            id: 1,
            name: "Lobby".into(),
            state: ArmState::Armed,
            ignored_on_arm: true,
            ignored_on_disarm: false,
        };
        assert!(device.is_ignored_for(ArmAction::Arm));
        assert!(!device.is_ignored_for(ArmAction::Disarm));
    }
}
