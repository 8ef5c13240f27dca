// ── Building domain types ──

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A building's arm/disarm schedule.
///
/// Deployments run one of two shapes: a daily start/end window, or a
/// single daily trigger time. Which shape a deployment uses is fixed by
/// configuration ([`ScheduleShape`]); the tagged value here carries the
/// actual times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    Window { start: NaiveTime, end: NaiveTime },
    Daily { time: NaiveTime },
}

impl Schedule {
    /// The shape of this schedule value.
    pub fn shape(&self) -> ScheduleShape {
        match self {
            Self::Window { .. } => ScheduleShape::Window,
            Self::Daily { .. } => ScheduleShape::Daily,
        }
    }
}

/// Which schedule shape a deployment uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleShape {
    #[default]
    Window,
    Daily,
}

/// User input for a schedule edit, before validation.
///
/// All fields optional: validation against the deployment's
/// [`ScheduleShape`] decides which are required.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleDraft {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub time: Option<NaiveTime>,
}

/// A site grouping one or more devices, with its own schedule.
///
/// Fetched as a batch at session start and replaced wholesale on reload.
/// `schedule` is mutated only by a successful schedule-save response;
/// buildings are never deleted client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: u64,
    pub name: String,
    pub schedule: Schedule,
}
