// ptzctl-core: camera registry, command translation and dispatch.
//
// Sits between the control surfaces (HTTP, CLI) and `ptzctl-api`. Nothing
// here opens sockets directly; every device exchange goes through the
// `DeviceDriver` a `DriverConnector` hands back.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod registry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::cgi::parse_legacy;
pub use command::control::parse_structured;
pub use command::{Command, CommandResult};
pub use config::{CameraConfig, Credentials, DispatchSettings, RegistrySettings};
pub use dispatch::ControlDispatcher;
pub use error::{CoreError, TranslationError};
pub use model::{CameraId, CameraSnapshot, ConnectionState};
pub use registry::{CameraRecord, CameraRegistry};
