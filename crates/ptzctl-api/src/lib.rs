// ptzctl-api: Device driver contract and ONVIF PTZ driver
//
// The core crate only ever talks to cameras through the `DriverConnector`
// and `DeviceDriver` traits defined here. `onvif` is the production
// implementation; tests substitute their own.

pub mod driver;
pub mod error;
pub mod models;
pub mod onvif;
pub mod transport;

pub use driver::{DeviceDriver, DeviceEndpoint, DriverConnector};
pub use error::Error;
pub use models::{ImagingSettings, MoveStatus, PresetEntry, PtzStatus, PtzVector};
pub use onvif::{OnvifConnector, OnvifDriver};
