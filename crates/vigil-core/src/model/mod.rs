//! Canonical domain types for the Vigil console.

mod building;
mod device;
mod panel;

pub use building::{Building, Schedule, ScheduleDraft, ScheduleShape};
pub use device::{ArmAction, ArmState, Device};
pub use panel::Panel;
