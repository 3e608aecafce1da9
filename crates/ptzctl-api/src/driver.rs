// ── Device driver contract ──
//
// A `DriverConnector` performs the handshake with one camera and yields a
// `DeviceDriver` bound to it. Every operation is a single network
// exchange; retries and ordering are the caller's business.

use std::future::Future;

use secrecy::SecretString;

use crate::error::Error;
use crate::models::{ImagingSettings, PresetEntry, PtzStatus, PtzVector};

/// Network address and credentials of one camera.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl DeviceEndpoint {
    /// `host:port`, for logs and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Establishes connections to cameras.
pub trait DriverConnector: Send + Sync + 'static {
    type Driver: DeviceDriver;

    /// Perform the device handshake. May block on the network for as long
    /// as the device takes; callers bound it with their own timeout.
    fn connect(
        &self,
        endpoint: &DeviceEndpoint,
    ) -> impl Future<Output = Result<Self::Driver, Error>> + Send;
}

/// Operations on one connected camera.
pub trait DeviceDriver: Send + Sync + 'static {
    fn status(&self) -> impl Future<Output = Result<PtzStatus, Error>> + Send;

    /// Start a continuous move at the given normalized velocity.
    fn continuous_move(
        &self,
        velocity: PtzVector,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Stop pan, tilt and zoom.
    fn stop(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Recall a preset. `speed: None` leaves the speed to the device default.
    fn goto_preset(
        &self,
        token: &str,
        speed: Option<PtzVector>,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn goto_home(&self) -> impl Future<Output = Result<(), Error>> + Send;

    fn presets(&self) -> impl Future<Output = Result<Vec<PresetEntry>, Error>> + Send;

    fn set_preset(
        &self,
        token: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn remove_preset(&self, token: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Continuous focus move, `speed` in `[-1, 1]`.
    fn focus_move(&self, speed: f64) -> impl Future<Output = Result<(), Error>> + Send;

    fn focus_stop(&self) -> impl Future<Output = Result<(), Error>> + Send;

    fn imaging_settings(&self) -> impl Future<Output = Result<ImagingSettings, Error>> + Send;

    /// Write the fields that are `Some`, leave the rest untouched.
    fn set_imaging_settings(
        &self,
        settings: &ImagingSettings,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}
