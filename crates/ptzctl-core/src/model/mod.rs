// ── Domain model ──

mod camera;

pub use camera::{CameraId, CameraSnapshot, ConnectionState};
