//! One-shot `control` and `cgi` commands.
//!
//! The command is decoded before any camera is contacted, so a typo never
//! costs a connection timeout.

use std::sync::Arc;

use ptzctl_config::Config;
use ptzctl_core::{CameraId, Command, ControlDispatcher, parse_legacy, parse_structured};
use tracing::debug;

use crate::cli::{CgiArgs, ControlArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn structured(
    args: &ControlArgs,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let camera: CameraId = args.camera.parse()?;
    let params = args
        .params
        .iter()
        .map(|p| split_param(p))
        .collect::<Result<Vec<_>, _>>()?;
    let command = parse_structured(&args.operation, params)?;
    send(camera, command, config, global).await
}

pub async fn legacy(args: &CgiArgs, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let camera: CameraId = args.camera.parse()?;
    let command = parse_legacy(&args.args)?;
    send(camera, command, config, global).await
}

fn split_param(raw: &str) -> Result<(&str, &str), CliError> {
    raw.split_once('=').ok_or_else(|| CliError::Usage {
        arg: raw.to_owned(),
        reason: "expected KEY=VALUE".into(),
    })
}

async fn send(
    camera: CameraId,
    command: Command,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    debug!(%camera, command = command.name(), "decoded command");

    let registry = super::connect(config)?;
    if let Some(record) = registry.lookup(camera) {
        record.settled().await;
    }

    let dispatcher = ControlDispatcher::new(Arc::clone(&registry), config.dispatch_settings());
    let outcome = dispatcher.dispatch(camera, command).await;
    registry.shutdown().await;

    let result = outcome.map_err(|e| CliError::from_core(e, registry.len()))?;
    output::print_output(&output::render_result(global.output, &result)?, global.quiet);
    Ok(())
}
