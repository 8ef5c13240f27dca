// Shared transport configuration for building reqwest::Client instances.
//
// The panel service speaks plain JSON over HTTP; the only tunable that
// matters at this layer is the request timeout.

use std::time::Duration;

/// Transport configuration for the panel service HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("vigil/0.1.0")
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
