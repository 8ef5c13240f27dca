//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text and deterministic exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vigil_core::CoreError;

/// Exit codes for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Invalid input: {message}")]
    #[diagnostic(code(vigil::validation))]
    Validation { message: String },

    #[error("{resource_type} {identifier} not found")]
    #[diagnostic(
        code(vigil::not_found),
        help("List available {resource_type}s with: vigil {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Another operation is still in flight for this target")]
    #[diagnostic(
        code(vigil::conflict),
        help("Wait for the previous operation to settle and retry.")
    )]
    Conflict,

    #[error("Panel service request failed: {message}")]
    #[diagnostic(
        code(vigil::request_failed),
        help("Check that the panel service is running and reachable.")
    )]
    Request { message: String },

    #[error("Configuration error")]
    #[diagnostic(
        code(vigil::config),
        help("Set server_url in the config file or pass --server / VIGIL_SERVER_URL.")
    )]
    Config {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict => exit_code::CONFLICT,
            Self::Request { .. } => exit_code::CONNECTION,
            Self::Config { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => Self::Validation { message },
            CoreError::MutationInFlight | CoreError::LoadInFlight { .. } => Self::Conflict,
            CoreError::BuildingNotFound { building_id } => Self::NotFound {
                resource_type: "building".into(),
                identifier: building_id.to_string(),
                list_command: "buildings list".into(),
            },
            CoreError::DeviceNotFound { device_id } => Self::NotFound {
                resource_type: "device".into(),
                identifier: device_id.to_string(),
                list_command: "devices list".into(),
            },
            CoreError::PanelUnavailable => Self::Request {
                message: "panel status has not been loaded".into(),
            },
            CoreError::Request { message } => Self::Request { message },
            CoreError::Config { message } => Self::Validation { message },
        }
    }
}

impl From<vigil_config::ConfigError> for CliError {
    fn from(err: vigil_config::ConfigError) -> Self {
        Self::Config {
            source: Box::new(err),
        }
    }
}

impl From<vigil_api::Error> for CliError {
    fn from(err: vigil_api::Error) -> Self {
        Self::Request {
            message: err.to_string(),
        }
    }
}
