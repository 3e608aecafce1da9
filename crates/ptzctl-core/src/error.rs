// ── Core error types ──
//
// Every outcome a control surface must tell apart has its own variant:
// a malformed command, an unknown camera, a camera that is not connected,
// and a device that failed or timed out. None of them is fatal.

use thiserror::Error;

use crate::model::{CameraId, ConnectionState};

/// Errors returned by `ControlDispatcher::dispatch` and the translators.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Camera {id} not found")]
    CameraNotFound { id: CameraId },

    #[error("Camera {id} ({name}) is not connected: {state}{}", reason_suffix(.reason.as_deref()))]
    CameraNotConnected {
        id: CameraId,
        name: String,
        state: ConnectionState,
        /// Why the handshake failed, when `state` is `Failed`.
        reason: Option<String>,
    },

    // ── Translation ──────────────────────────────────────────────────
    #[error(transparent)]
    Translation(#[from] TranslationError),

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device error: {0}")]
    Driver(#[from] ptzctl_api::Error),
}

impl CoreError {
    /// Whether the device call ran out of time (as opposed to failing).
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Driver(ptzctl_api::Error::Timeout { .. }))
    }
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(" ({r})")).unwrap_or_default()
}

/// A command string or parameter set that does not decode.
///
/// Raised before any device contact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    // ── Legacy CGI grammar ───────────────────────────────────────────
    #[error("not a ptzcmd argument list: {args:?}")]
    NotPtzCommand { args: String },

    #[error("ptzcmd is missing an action")]
    MissingAction,

    #[error("unrecognized command: {action}")]
    UnrecognizedCommand { action: String },

    #[error("{action} requires a numeric argument")]
    MissingArgument { action: String },

    #[error("{action} argument is not an integer: {value:?}")]
    InvalidArgument { action: String, value: String },

    #[error("preset index must be at least 1, got {index}")]
    InvalidPresetIndex { index: i32 },

    // ── Structured control API ───────────────────────────────────────
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("{operation} does not accept parameter {param:?}")]
    UnexpectedParameter { operation: String, param: String },

    #[error("{operation} requires parameter {param:?}")]
    MissingParameter {
        operation: String,
        param: &'static str,
    },

    #[error("{operation}: invalid value {value:?} for {param:?}")]
    InvalidParameter {
        operation: String,
        param: String,
        value: String,
    },

    #[error("invalid camera id: {value:?}")]
    InvalidCameraId { value: String },
}
