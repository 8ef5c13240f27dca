// ── Core error types ──
//
// User-facing errors from vigil-core. These are NOT wire-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<vigil_api::Error>` impl translates transport-layer errors
// into the request-failure variant with its human-readable detail.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Validation` failures are local and occur before any request is sent
/// (and before any optimistic apply, so no rollback is needed). `Request`
/// failures trigger rollback of whatever was optimistically applied.
/// A partial bulk outcome is NOT an error — see
/// [`MutationOutcome::Partial`](crate::mutation::MutationOutcome).
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local failures (gateway never invoked) ───────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Another mutation is already in flight for this target")]
    MutationInFlight,

    #[error("A device load is already in flight for building {building_id}")]
    LoadInFlight { building_id: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Building not found: {building_id}")]
    BuildingNotFound { building_id: u64 },

    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: u64 },

    #[error("Panel status has not been loaded")]
    PanelUnavailable,

    // ── Gateway failures ─────────────────────────────────────────────
    #[error("Request failed: {message}")]
    Request { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// `true` for failures detected locally, before any request was sent.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Request { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vigil_api::Error> for CoreError {
    fn from(err: vigil_api::Error) -> Self {
        // The api error's Display already carries the service detail;
        // the core only ever surfaces success/failure plus the message.
        CoreError::Request {
            message: err.to_string(),
        }
    }
}
