// Panel service HTTP client
//
// Wraps `reqwest::Client` with service-specific URL construction and
// error-body decoding. Non-2xx responses carry a `{"detail": "..."}`
// body; the detail string is surfaced through `Error::Api` so callers
// never have to look at status codes themselves.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    ActionRequest, ActionSummaryRecord, BuildingRecord, DeviceRecord, ErrorBody, IgnoreBulkRequest,
    IgnoreRequest, PanelStatusRecord, ScheduleRequest,
};
use crate::transport::TransportConfig;

/// Raw HTTP client for the panel service REST API.
pub struct PanelClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PanelClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the service root (e.g. `http://127.0.0.1:8000`);
    /// the `/api` prefix is appended per request.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/{path}");
        Url::parse(&full).expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Decode a response body, translating non-2xx statuses into
    /// `Error::Api` with the service's `detail` message.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            return Err(Error::Api {
                message,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    // ── Buildings ────────────────────────────────────────────────────

    /// List all buildings with their schedules.
    ///
    /// `GET /api/buildings`
    pub async fn list_buildings(&self) -> Result<Vec<BuildingRecord>, Error> {
        let url = self.api_url("buildings");
        debug!("listing buildings");
        self.get(url).await
    }

    /// Save a building's arm/disarm schedule.
    ///
    /// `POST /api/buildings/{id}/time`
    pub async fn set_building_schedule(&self, request: &ScheduleRequest) -> Result<(), Error> {
        let url = self.api_url(&format!("buildings/{}/time", request.building_id));
        debug!(building_id = request.building_id, "saving building schedule");
        let _: serde_json::Value = self.post(url, request).await?;
        Ok(())
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// List devices for a building, paginated and optionally filtered
    /// by a search string.
    ///
    /// `GET /api/devices?building=&limit=&offset=&search=`
    pub async fn list_devices(
        &self,
        building_id: u64,
        limit: usize,
        offset: usize,
        search: &str,
    ) -> Result<Vec<DeviceRecord>, Error> {
        let mut url = self.api_url("devices");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("building", &building_id.to_string());
            pairs.append_pair("limit", &limit.to_string());
            pairs.append_pair("offset", &offset.to_string());
            if !search.is_empty() {
                pairs.append_pair("search", search);
            }
        }
        debug!(building_id, limit, offset, search, "listing devices");
        self.get(url).await
    }

    /// Arm or disarm a set of devices in one request.
    ///
    /// `POST /api/devices/action` — the response carries per-device
    /// results; a mixed outcome still returns HTTP 200.
    pub async fn perform_action(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionSummaryRecord, Error> {
        let url = self.api_url("devices/action");
        debug!(
            targets = request.device_ids.len(),
            action = %request.action,
            "performing bulk device action"
        );
        self.post(url, request).await
    }

    // ── Ignore flags ─────────────────────────────────────────────────

    /// Set the ignore flags for a single device.
    ///
    /// `POST /api/proevents/ignore`
    pub async fn set_ignore_flags(&self, request: &IgnoreRequest) -> Result<(), Error> {
        let url = self.api_url("proevents/ignore");
        debug!(device_id = request.device_id, "updating ignore flags");
        let _: serde_json::Value = self.post(url, request).await?;
        Ok(())
    }

    /// Set ignore flags for multiple devices in one request.
    ///
    /// `POST /api/proevents/ignore/bulk`
    pub async fn set_ignore_flags_bulk(&self, request: &IgnoreBulkRequest) -> Result<(), Error> {
        let url = self.api_url("proevents/ignore/bulk");
        debug!(items = request.items.len(), "updating ignore flags in bulk");
        let _: serde_json::Value = self.post(url, request).await?;
        Ok(())
    }

    // ── Panel ────────────────────────────────────────────────────────

    /// Fetch the global panel armed flag.
    ///
    /// `GET /api/panel_status`
    pub async fn panel_status(&self) -> Result<PanelStatusRecord, Error> {
        let url = self.api_url("panel_status");
        self.get(url).await
    }

    /// Set the global panel armed flag.
    ///
    /// `POST /api/panel_status`
    pub async fn set_panel_status(&self, armed: bool) -> Result<PanelStatusRecord, Error> {
        let url = self.api_url("panel_status");
        debug!(armed, "setting panel status");
        self.post(url, &PanelStatusRecord { armed }).await
    }
}
