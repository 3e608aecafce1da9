// ── Control dispatcher ──
//
// Binds a `Command` to one camera: resolve the record, require `Connected`,
// then make exactly one driver call under the request timeout. Nothing is
// queued, retried or deduplicated here.

use std::sync::Arc;

use ptzctl_api::{DeviceDriver, PresetEntry, PtzVector};
use tracing::debug;

use crate::command::{Command, CommandResult};
use crate::config::DispatchSettings;
use crate::error::CoreError;
use crate::model::CameraId;
use crate::registry::CameraRegistry;

/// Executes commands against cameras in a shared registry.
pub struct ControlDispatcher<D> {
    registry: Arc<CameraRegistry<D>>,
    settings: DispatchSettings,
}

impl<D> Clone for ControlDispatcher<D> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            settings: self.settings,
        }
    }
}

impl<D: DeviceDriver> ControlDispatcher<D> {
    pub fn new(registry: Arc<CameraRegistry<D>>, settings: DispatchSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &Arc<CameraRegistry<D>> {
        &self.registry
    }

    /// Run `command` on camera `id`.
    ///
    /// Unknown ids give `CameraNotFound`; cameras still connecting or failed
    /// give `CameraNotConnected` without touching the driver.
    pub async fn dispatch(&self, id: CameraId, command: Command) -> Result<CommandResult, CoreError> {
        let driver = self
            .registry
            .lookup(id)
            .ok_or(CoreError::CameraNotFound { id })?
            .connected()
            .map_err(|snapshot| CoreError::CameraNotConnected {
                id,
                name: snapshot.name,
                state: snapshot.state,
                reason: snapshot.last_error,
            })?;

        debug!(camera = %id, command = command.name(), "dispatching");

        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, execute(&*driver, command)).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => Err(CoreError::Driver(ptzctl_api::Error::Timeout {
                timeout_secs: timeout.as_secs(),
            })),
        }
    }
}

async fn execute<D: DeviceDriver>(
    driver: &D,
    command: Command,
) -> Result<CommandResult, ptzctl_api::Error> {
    match command {
        Command::Move { pan, tilt, zoom } => {
            driver
                .continuous_move(PtzVector::new(pan, tilt, zoom))
                .await?;
        }
        Command::Stop => driver.stop().await?,
        Command::Home => driver.goto_home().await?,
        Command::GotoPreset { token, velocity } => driver.goto_preset(&token, velocity).await?,
        Command::SetPreset { token, name } => driver.set_preset(&token, &name).await?,
        Command::RemovePreset { token } => driver.remove_preset(&token).await?,
        Command::FocusMove { speed } => driver.focus_move(speed).await?,
        Command::FocusStop => driver.focus_stop().await?,
        Command::GetStatus => return Ok(CommandResult::Status(driver.status().await?)),
        Command::GetPresets => {
            let mut presets = driver.presets().await?;
            sort_presets(&mut presets);
            return Ok(CommandResult::Presets(presets));
        }
        Command::GetImaging => {
            return Ok(CommandResult::Imaging(driver.imaging_settings().await?));
        }
        Command::SetImaging(settings) => driver.set_imaging_settings(&settings).await?,
    }
    Ok(CommandResult::Ok)
}

/// Numeric tokens first in numeric order, then the rest by token.
fn sort_presets(presets: &mut [PresetEntry]) {
    presets.sort_by(|a, b| {
        let key = |p: &PresetEntry| p.token.trim().parse::<i64>().ok();
        match (key(a), key(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.token.cmp(&b.token),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(token: &str) -> PresetEntry {
        PresetEntry {
            token: token.into(),
            name: format!("p{token}"),
        }
    }

    #[test]
    fn presets_sort_numerically_then_by_token() {
        let mut presets = vec![preset("10"), preset("b"), preset("2"), preset("a"), preset("0")];
        sort_presets(&mut presets);
        let order: Vec<_> = presets.iter().map(|p| p.token.as_str()).collect();
        assert_eq!(order, ["0", "2", "10", "a", "b"]);
    }
}
