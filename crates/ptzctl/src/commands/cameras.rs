use ptzctl_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Connect to everything, wait until each camera has settled, print the table.
pub async fn handle(config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let registry = super::connect(config)?;
    registry.wait_settled().await;

    let snapshots = registry.snapshots();
    registry.shutdown().await;

    let rendered =
        output::render_cameras(global.output, &snapshots, output::should_color(global.color))?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
