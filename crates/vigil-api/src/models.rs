// Wire types for the panel service REST API.
//
// These mirror the service's JSON bodies verbatim. `vigil-core` converts
// them into canonical domain types; nothing here is exposed to UI layers.

use serde::{Deserialize, Serialize};

/// A building as returned by `GET /api/buildings`.
///
/// The schedule comes in one of two deployment-dependent shapes: a
/// `start_time`/`end_time` window, or a single daily `time`. All three
/// fields are optional on the wire; the core decides which shape applies.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingRecord {
    pub id: u64,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub time: Option<String>,
}

/// A device (aka item/proevent) as returned by `GET /api/devices`.
///
/// `state` is free text on the wire; anything other than `"armed"` or
/// `"disarmed"` normalizes to unknown downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    pub id: u64,
    pub name: String,
    pub state: Option<String>,
    #[serde(default)]
    pub is_ignored_on_arm: bool,
    #[serde(default)]
    pub is_ignored_on_disarm: bool,
}

/// Request body for `POST /api/devices/action`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest {
    pub device_ids: Vec<u64>,
    pub action: String,
}

/// Per-device result inside an [`ActionSummaryRecord`].
#[derive(Debug, Clone, Deserialize)]
pub struct ActionDetailRecord {
    pub device_id: u64,
    pub status: String,
    pub message: Option<String>,
}

/// Response body of `POST /api/devices/action`.
///
/// A mixed outcome is not an HTTP error: the service reports both counts
/// and a per-device detail list in a 200 response.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSummaryRecord {
    pub success_count: u32,
    pub failure_count: u32,
    #[serde(default)]
    pub details: Vec<ActionDetailRecord>,
}

/// Request body for `POST /api/buildings/{id}/time`.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRequest {
    pub building_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Request body for `POST /api/proevents/ignore`.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoreRequest {
    pub device_id: u64,
    pub ignore_on_arm: bool,
    pub ignore_on_disarm: bool,
}

/// One entry of a `POST /api/proevents/ignore/bulk` request.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoreBulkItem {
    pub device_id: u64,
    pub building_id: u64,
    pub ignore_on_arm: bool,
    pub ignore_on_disarm: bool,
}

/// Request body for `POST /api/proevents/ignore/bulk`.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoreBulkRequest {
    pub items: Vec<IgnoreBulkItem>,
}

/// Body of `GET`/`POST /api/panel_status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PanelStatusRecord {
    pub armed: bool,
}

/// Error body the service attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
