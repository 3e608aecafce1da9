// ── Runtime camera configuration ──
//
// These types describe *which* cameras to connect to and how patient to be.
// They carry credential data but never touch disk: `ptzctl-config` builds
// them and hands them in.

use std::time::Duration;

use ptzctl_api::DeviceEndpoint;
use secrecy::SecretString;

/// Device login. An empty username disables WS-Security signing.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// One configured camera. Position in the configured sequence decides its id.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    /// The login, or the reason none could be resolved. A camera without
    /// credentials still gets a record; it fails instead of connecting.
    pub credentials: Result<Credentials, String>,
}

impl CameraConfig {
    /// Address and credentials in the form the driver layer expects.
    pub fn endpoint(&self) -> Result<DeviceEndpoint, String> {
        let credentials = self.credentials.as_ref().map_err(Clone::clone)?;
        Ok(DeviceEndpoint {
            host: self.host.clone(),
            port: self.port,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }
}

/// Connection-lifecycle tuning for `CameraRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Upper bound on one camera's handshake before it is marked failed.
    pub connect_timeout: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(20),
        }
    }
}

/// Per-command tuning for `ControlDispatcher`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Upper bound on a single device call.
    pub request_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }
}
