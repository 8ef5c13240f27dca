// ── Wire-to-domain type conversions ──
//
// Bridges raw `vigil_api` records into canonical `vigil_core::model`
// types. Each function normalizes field names, parses strings into
// strong types, and fills sensible defaults for missing optional data.

use chrono::NaiveTime;
use tracing::warn;

use vigil_api::models::{
    ActionDetailRecord, ActionSummaryRecord, BuildingRecord, DeviceRecord, IgnoreBulkItem,
    ScheduleRequest,
};

use crate::gateway::{ActionDetail, ActionOutcome, ActionStatus, IgnoreFlagsUpdate};
use crate::model::{ArmState, Building, Device, Schedule};

const TIME_FORMAT: &str = "%H:%M";

// Service defaults for buildings with no stored window.
const DEFAULT_WINDOW_START: (u32, u32) = (9, 0);
const DEFAULT_WINDOW_END: (u32, u32) = (17, 0);

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an `"HH:MM"` wire string, dropping unparseable values.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let parsed = NaiveTime::parse_from_str(raw, TIME_FORMAT).ok();
    if parsed.is_none() {
        warn!(raw, "unparseable schedule time, ignoring");
    }
    parsed
}

fn default_window() -> Schedule {
    let (sh, sm) = DEFAULT_WINDOW_START;
    let (eh, em) = DEFAULT_WINDOW_END;
    // Both constants are valid times-of-day.
    match (
        NaiveTime::from_hms_opt(sh, sm, 0),
        NaiveTime::from_hms_opt(eh, em, 0),
    ) {
        (Some(start), Some(end)) => Schedule::Window { start, end },
        _ => unreachable!("default schedule constants are valid"),
    }
}

// ── Building ───────────────────────────────────────────────────────

/// Convert a wire building record, resolving the schedule shape.
///
/// A `time` field wins (single-time deployments); otherwise a complete
/// `start_time`/`end_time` pair forms a window; anything else falls back
/// to the service's default window.
pub(crate) fn building(record: BuildingRecord) -> Building {
    let daily = record.time.as_deref().and_then(parse_time);
    let window = match (
        record.start_time.as_deref().and_then(parse_time),
        record.end_time.as_deref().and_then(parse_time),
    ) {
        (Some(start), Some(end)) => Some(Schedule::Window { start, end }),
        _ => None,
    };

    let schedule = daily
        .map(|time| Schedule::Daily { time })
        .or(window)
        .unwrap_or_else(default_window);

    Building {
        id: record.id,
        name: record.name,
        schedule,
    }
}

/// Build the wire request for a schedule save.
pub(crate) fn schedule_request(building_id: u64, schedule: &Schedule) -> ScheduleRequest {
    match schedule {
        Schedule::Window { start, end } => ScheduleRequest {
            building_id,
            start_time: Some(start.format(TIME_FORMAT).to_string()),
            end_time: Some(end.format(TIME_FORMAT).to_string()),
            time: None,
        },
        Schedule::Daily { time } => ScheduleRequest {
            building_id,
            start_time: None,
            end_time: None,
            time: Some(time.format(TIME_FORMAT).to_string()),
        },
    }
}

// ── Device ─────────────────────────────────────────────────────────

/// Convert a wire device record, normalizing the state string.
pub(crate) fn device(record: DeviceRecord) -> Device {
    let state = record
        .state
        .as_deref()
        .and_then(|s| s.parse::<ArmState>().ok())
        .unwrap_or(ArmState::Unknown);

    Device {
        id: record.id,
        name: record.name,
        state,
        ignored_on_arm: record.is_ignored_on_arm,
        ignored_on_disarm: record.is_ignored_on_disarm,
    }
}

// ── Bulk action results ────────────────────────────────────────────

fn action_detail(record: ActionDetailRecord) -> ActionDetail {
    // Anything other than an explicit "Success" is a failure; an
    // unrecognized status must never leave a speculative state applied.
    let status = if record.status.eq_ignore_ascii_case("success") {
        ActionStatus::Success
    } else {
        ActionStatus::Failure
    };

    ActionDetail {
        device_id: record.device_id,
        status,
        message: record.message,
    }
}

pub(crate) fn action_outcome(record: ActionSummaryRecord) -> ActionOutcome {
    ActionOutcome {
        success_count: record.success_count,
        failure_count: record.failure_count,
        details: record.details.into_iter().map(action_detail).collect(),
    }
}

// ── Ignore flags ───────────────────────────────────────────────────

pub(crate) fn ignore_bulk_item(update: &IgnoreFlagsUpdate) -> IgnoreBulkItem {
    IgnoreBulkItem {
        device_id: update.device_id,
        building_id: update.building_id,
        ignore_on_arm: update.ignore_on_arm,
        ignore_on_disarm: update.ignore_on_disarm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: Option<&str>, end: Option<&str>, time: Option<&str>) -> BuildingRecord {
        BuildingRecord {
            id: 1,
            name: "Annex".into(),
            start_time: start.map(Into::into),
            end_time: end.map(Into::into),
            time: time.map(Into::into),
        }
    }

    #[test]
    fn window_shape_from_start_end_pair() {
        let b = building(record(Some("08:30"), Some("18:00"), None));
        assert!(matches!(b.schedule, Schedule::Window { .. }));
    }

    #[test]
    fn daily_shape_wins_when_time_present() {
        let b = building(record(Some("08:30"), Some("18:00"), Some("06:15")));
        assert!(matches!(b.schedule, Schedule::Daily { .. }));
    }

    #[test]
    fn incomplete_window_falls_back_to_default() {
        let b = building(record(Some("08:30"), None, None));
        let Schedule::Window { start, end } = b.schedule else {
            panic!("expected window schedule");
        };
        assert_eq!(start.format(TIME_FORMAT).to_string(), "09:00");
        assert_eq!(end.format(TIME_FORMAT).to_string(), "17:00");
    }

    #[test]
    fn device_state_normalizes_to_unknown() {
        let d = device(DeviceRecord {
            id: 9,
            name: "Vault".into(),
            state: Some("tampered".into()),
            is_ignored_on_arm: false,
            is_ignored_on_disarm: false,
        });
        assert_eq!(d.state, ArmState::Unknown);

        let d = device(DeviceRecord {
            id: 9,
            name: "Vault".into(),
            state: None,
            is_ignored_on_arm: false,
            is_ignored_on_disarm: false,
        });
        assert_eq!(d.state, ArmState::Unknown);
    }

    #[test]
    fn unrecognized_detail_status_is_failure() {
        let outcome = action_outcome(ActionSummaryRecord {
            success_count: 1,
            failure_count: 1,
            details: vec![
                ActionDetailRecord {
                    device_id: 1,
                    status: "Success".into(),
                    message: None,
                },
                ActionDetailRecord {
                    device_id: 2,
                    status: "Pending".into(),
                    message: None,
                },
            ],
        });
        assert_eq!(outcome.details[0].status, ActionStatus::Success);
        assert_eq!(outcome.details[1].status, ActionStatus::Failure);
    }
}
