//! CLI error types with miette diagnostics.
//!
//! Wraps library errors into user-facing diagnostics with help text and a
//! distinct exit code per failure class.

use std::net::SocketAddr;

use miette::Diagnostic;
use thiserror::Error;

use ptzctl_config::ConfigError;
use ptzctl_core::{CameraId, ConnectionState, CoreError, TranslationError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(ptzctl::translation),
        help("Run: ptzctl control --help or ptzctl cgi --help for the accepted syntax")
    )]
    Translation(#[from] TranslationError),

    #[error("Invalid argument {arg:?}: {reason}")]
    #[diagnostic(code(ptzctl::usage))]
    Usage { arg: String, reason: String },

    // ── Cameras ──────────────────────────────────────────────────────
    #[error("Camera {id} not found")]
    #[diagnostic(
        code(ptzctl::camera_not_found),
        help("{configured} camera(s) configured. Run: ptzctl cameras")
    )]
    CameraNotFound { id: CameraId, configured: usize },

    #[error("Camera {id} ({name}) is {state}")]
    #[diagnostic(code(ptzctl::not_connected))]
    NotConnected {
        id: CameraId,
        name: String,
        state: ConnectionState,
        #[help]
        reason: String,
    },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Camera rejected the request: {message}")]
    #[diagnostic(code(ptzctl::device))]
    Device { message: String },

    #[error("Camera did not answer within {seconds}s")]
    #[diagnostic(
        code(ptzctl::timeout),
        help("Raise general.request_timeout_secs or check the camera's network path.")
    )]
    Timeout { seconds: u64 },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(ptzctl::config),
        help("Run: ptzctl config path to see which file is read")
    )]
    Config(#[from] ConfigError),

    // ── Runtime ──────────────────────────────────────────────────────
    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(ptzctl::bind),
        help("Another process may own the port. Try --port.")
    )]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not open log directory: {0}")]
    #[diagnostic(code(ptzctl::logging))]
    Logging(#[from] tracing_appender::rolling::InitError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Translation(_) | Self::Usage { .. } => exit_code::USAGE,
            Self::CameraNotFound { .. } => exit_code::NOT_FOUND,
            Self::NotConnected { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the configured camera count to a core error.
    pub fn from_core(err: CoreError, configured: usize) -> Self {
        match err {
            CoreError::CameraNotFound { id } => Self::CameraNotFound { id, configured },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CameraNotFound { id } => Self::CameraNotFound { id, configured: 0 },
            CoreError::CameraNotConnected {
                id,
                name,
                state,
                reason,
            } => Self::NotConnected {
                id,
                name,
                state,
                reason: reason.unwrap_or_else(|| match state {
                    ConnectionState::Connecting => "The camera is still connecting.".into(),
                    _ => "Check the camera address, port and credentials.".into(),
                }),
            },
            CoreError::Translation(err) => Self::Translation(err),
            CoreError::Driver(err) => err.into(),
        }
    }
}

impl From<ptzctl_api::Error> for CliError {
    fn from(err: ptzctl_api::Error) -> Self {
        match err {
            ptzctl_api::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            other => Self::Device {
                message: other.to_string(),
            },
        }
    }
}
