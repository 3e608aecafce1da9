// ── Device-level data types ──
//
// Plain data returned by or handed to a `DeviceDriver`. These are the
// only device shapes that cross into `ptzctl-core`.

use serde::{Deserialize, Serialize};

/// A pan/tilt/zoom triple, used both for velocities and positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PtzVector {
    pub pan: f64,
    pub tilt: f64,
    pub zoom: f64,
}

impl PtzVector {
    pub const fn new(pan: f64, tilt: f64, zoom: f64) -> Self {
        Self { pan, tilt, zoom }
    }

    /// Clamp every axis into the normalized `[-1, 1]` range.
    pub fn clamped(self) -> Self {
        Self {
            pan: self.pan.clamp(-1.0, 1.0),
            tilt: self.tilt.clamp(-1.0, 1.0),
            zoom: self.zoom.clamp(-1.0, 1.0),
        }
    }
}

/// Movement state per axis group, as reported by the device
/// (`IDLE`, `MOVING`, or `UNKNOWN` on ONVIF cameras).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_tilt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<String>,
}

/// Snapshot of the PTZ head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PtzStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PtzVector>,
    pub move_status: MoveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_time: Option<String>,
}

/// A device-stored preset position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetEntry {
    pub token: String,
    pub name: String,
}

/// Image-quality parameters passed through to the device unchanged.
///
/// `None` means "not reported" when reading and "leave as is" when writing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<f64>,
}

impl ImagingSettings {
    pub fn is_empty(&self) -> bool {
        self.brightness.is_none()
            && self.color_saturation.is_none()
            && self.contrast.is_none()
            && self.sharpness.is_none()
    }
}
