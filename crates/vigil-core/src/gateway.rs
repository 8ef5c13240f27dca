// ── Gateway seam ──
//
// The core consumes the remote authority through this trait only. The
// production implementation wraps `vigil_api::PanelClient`; tests swap in
// scripted fakes. Responses cross the seam already converted to domain
// types -- the core never inspects wire DTOs or status codes.

use async_trait::async_trait;

use vigil_api::PanelClient;

use crate::convert;
use crate::error::CoreError;
use crate::model::{ArmAction, Building, Device, Schedule};

/// Per-device status inside an [`ActionOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Success,
    Failure,
}

/// Per-device result of a bulk arm/disarm request.
#[derive(Debug, Clone)]
pub struct ActionDetail {
    pub device_id: u64,
    pub status: ActionStatus,
    pub message: Option<String>,
}

/// Authoritative per-item result set for a bulk action.
///
/// A mixed outcome is a first-class result, not a failure: both counts
/// are carried, and each target maps to success or failure with a reason.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub success_count: u32,
    pub failure_count: u32,
    pub details: Vec<ActionDetail>,
}

impl ActionOutcome {
    /// The IDs the authority reports as succeeded.
    pub fn succeeded_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.details
            .iter()
            .filter(|d| d.status == ActionStatus::Success)
            .map(|d| d.device_id)
    }
}

/// One entry of a bulk ignore-flag edit.
#[derive(Debug, Clone, Copy)]
pub struct IgnoreFlagsUpdate {
    pub device_id: u64,
    pub building_id: u64,
    pub ignore_on_arm: bool,
    pub ignore_on_disarm: bool,
}

/// Abstract remote authority consumed by the core.
///
/// Every method maps to one REST operation; any non-success response
/// surfaces as [`CoreError::Request`] carrying the service's detail
/// string.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_buildings(&self) -> Result<Vec<Building>, CoreError>;

    async fn list_devices(
        &self,
        building_id: u64,
        limit: usize,
        offset: usize,
        search: &str,
    ) -> Result<Vec<Device>, CoreError>;

    async fn set_building_schedule(
        &self,
        building_id: u64,
        schedule: &Schedule,
    ) -> Result<(), CoreError>;

    async fn perform_action(
        &self,
        device_ids: &[u64],
        action: ArmAction,
    ) -> Result<ActionOutcome, CoreError>;

    async fn set_ignore_flags(
        &self,
        device_id: u64,
        ignore_on_arm: bool,
        ignore_on_disarm: bool,
    ) -> Result<(), CoreError>;

    async fn set_ignore_flags_bulk(&self, items: &[IgnoreFlagsUpdate]) -> Result<(), CoreError>;

    async fn panel_status(&self) -> Result<bool, CoreError>;

    async fn set_panel_status(&self, armed: bool) -> Result<(), CoreError>;
}

// ── Production implementation ────────────────────────────────────────

/// [`Gateway`] implementation backed by the panel service REST API.
pub struct RestGateway {
    client: PanelClient,
}

impl RestGateway {
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn list_buildings(&self) -> Result<Vec<Building>, CoreError> {
        let records = self.client.list_buildings().await?;
        Ok(records.into_iter().map(convert::building).collect())
    }

    async fn list_devices(
        &self,
        building_id: u64,
        limit: usize,
        offset: usize,
        search: &str,
    ) -> Result<Vec<Device>, CoreError> {
        let records = self
            .client
            .list_devices(building_id, limit, offset, search)
            .await?;
        Ok(records.into_iter().map(convert::device).collect())
    }

    async fn set_building_schedule(
        &self,
        building_id: u64,
        schedule: &Schedule,
    ) -> Result<(), CoreError> {
        let request = convert::schedule_request(building_id, schedule);
        self.client.set_building_schedule(&request).await?;
        Ok(())
    }

    async fn perform_action(
        &self,
        device_ids: &[u64],
        action: ArmAction,
    ) -> Result<ActionOutcome, CoreError> {
        let request = vigil_api::models::ActionRequest {
            device_ids: device_ids.to_vec(),
            action: action.to_string(),
        };
        let summary = self.client.perform_action(&request).await?;
        Ok(convert::action_outcome(summary))
    }

    async fn set_ignore_flags(
        &self,
        device_id: u64,
        ignore_on_arm: bool,
        ignore_on_disarm: bool,
    ) -> Result<(), CoreError> {
        let request = vigil_api::models::IgnoreRequest {
            device_id,
            ignore_on_arm,
            ignore_on_disarm,
        };
        self.client.set_ignore_flags(&request).await?;
        Ok(())
    }

    async fn set_ignore_flags_bulk(&self, items: &[IgnoreFlagsUpdate]) -> Result<(), CoreError> {
        let request = vigil_api::models::IgnoreBulkRequest {
            items: items.iter().map(convert::ignore_bulk_item).collect(),
        };
        self.client.set_ignore_flags_bulk(&request).await?;
        Ok(())
    }

    async fn panel_status(&self) -> Result<bool, CoreError> {
        Ok(self.client.panel_status().await?.armed)
    }

    async fn set_panel_status(&self, armed: bool) -> Result<(), CoreError> {
        self.client.set_panel_status(armed).await?;
        Ok(())
    }
}
