// ── Camera identity and connection state ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::error::TranslationError;

// ── CameraId ────────────────────────────────────────────────────────

/// 1-based camera identity, assigned in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(u32);

impl CameraId {
    /// The id control surfaces fall back to when a request names none.
    pub const DEFAULT: Self = Self(1);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for CameraId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CameraId {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(raw) if raw > 0 => Ok(Self(raw)),
            _ => Err(TranslationError::InvalidCameraId {
                value: s.to_owned(),
            }),
        }
    }
}

// ── ConnectionState ─────────────────────────────────────────────────

/// Where a camera's single connection attempt stands.
///
/// `Connected` and `Failed` are terminal for the life of the process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Failed,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Connecting)
    }
}

// ── CameraSnapshot ──────────────────────────────────────────────────

/// Point-in-time view of one camera, for listings and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraSnapshot {
    pub id: CameraId,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub state: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
