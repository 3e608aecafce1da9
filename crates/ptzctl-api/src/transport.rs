// HTTP client settings shared by every camera a connector reaches.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("ptzctl/", env!("CARGO_PKG_VERSION"));

/// Settings for the connector's `reqwest::Client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Per-request timeout applied by reqwest itself.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        Ok(reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?)
    }
}
