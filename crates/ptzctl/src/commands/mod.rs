//! Command handlers, one module per subcommand.

pub mod cameras;
pub mod config_cmd;
pub mod control;
pub mod serve;

use std::sync::Arc;

use ptzctl_api::transport::TransportConfig;
use ptzctl_api::{OnvifConnector, OnvifDriver};
use ptzctl_config::Config;
use ptzctl_core::CameraRegistry;

use crate::error::CliError;

/// Start connecting to every configured camera. Returns immediately.
fn connect(config: &Config) -> Result<Arc<CameraRegistry<OnvifDriver>>, CliError> {
    let cameras = config.camera_configs();
    let transport = TransportConfig {
        timeout: config.dispatch_settings().request_timeout,
    };
    let connector = OnvifConnector::new(&transport)?;

    tracing::debug!(cameras = cameras.len(), "initializing camera registry");
    Ok(Arc::new(CameraRegistry::initialize(
        cameras,
        connector,
        config.registry_settings(),
    )))
}
