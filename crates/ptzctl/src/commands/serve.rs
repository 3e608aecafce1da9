use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use ptzctl_config::Config;
use ptzctl_core::ControlDispatcher;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::server;

pub async fn handle(args: &ServeArgs, config: &Config) -> Result<(), CliError> {
    let mut addr = config.bind_address();
    if let Some(port) = args.port {
        addr.set_port(port);
    }
    if args.remote {
        addr.set_ip(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CliError::Bind { addr, source })?;

    let registry = super::connect(config)?;
    let dispatcher = ControlDispatcher::new(Arc::clone(&registry), config.dispatch_settings());
    info!(%addr, cameras = registry.len(), "control surface listening");

    axum::serve(listener, server::router(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    registry.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
}
