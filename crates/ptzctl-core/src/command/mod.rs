// ── Command API ──
//
// Every control surface decodes its wire format into one `Command`; the
// dispatcher maps each variant onto exactly one `DeviceDriver` call.

pub mod cgi;
pub mod control;

use ptzctl_api::{ImagingSettings, PresetEntry, PtzStatus, PtzVector};
use strum::IntoStaticStr;

/// The normalized device-control vocabulary.
///
/// Velocities and speeds are in the normalized `[-1, 1]` space; the legacy
/// decoder can exceed it, and the driver clamps.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    // ── Motion ───────────────────────────────────────────────────────
    Move {
        pan: f64,
        tilt: f64,
        zoom: f64,
    },
    Stop,
    Home,

    // ── Presets ──────────────────────────────────────────────────────
    GotoPreset {
        token: String,
        /// `None` leaves the recall speed to the device.
        velocity: Option<PtzVector>,
    },
    SetPreset {
        token: String,
        name: String,
    },
    RemovePreset {
        token: String,
    },

    // ── Focus ────────────────────────────────────────────────────────
    FocusMove {
        speed: f64,
    },
    FocusStop,

    // ── Queries ──────────────────────────────────────────────────────
    GetStatus,
    GetPresets,

    // ── Imaging pass-through ─────────────────────────────────────────
    GetImaging,
    SetImaging(ImagingSettings),
}

impl Command {
    /// Stable snake_case name, for logs.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Ok,
    Status(PtzStatus),
    Presets(Vec<PresetEntry>),
    Imaging(ImagingSettings),
}
