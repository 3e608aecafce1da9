mod cli;
mod commands;
mod error;
mod output;
mod server;

use std::path::Path;

use clap::{CommandFactory, Parser};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use ptzctl_config::Config;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { global, command } = cli;

    match command {
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "ptzctl", &mut std::io::stdout());
            Ok(())
        }
        Command::Config(args) => commands::config_cmd::handle(&args, &global),
        Command::Serve(args) => {
            let (config, _log_guard) = prepare(&global)?;
            commands::serve::handle(&args, &config).await
        }
        Command::Cameras => {
            let (config, _log_guard) = prepare(&global)?;
            commands::cameras::handle(&config, &global).await
        }
        Command::Control(args) => {
            let (config, _log_guard) = prepare(&global)?;
            commands::control::structured(&args, &config, &global).await
        }
        Command::Cgi(args) => {
            let (config, _log_guard) = prepare(&global)?;
            commands::control::legacy(&args, &config, &global).await
        }
    }
}

/// Load the configuration and start logging. The guard flushes the log file
/// on drop and must outlive the command.
fn prepare(global: &GlobalOpts) -> Result<(Config, Option<WorkerGuard>), CliError> {
    let config = ptzctl_config::load_config(global.config.as_deref())?;
    let guard = init_tracing(global, config.general.log_dir.as_deref())?;
    Ok((config, guard))
}

// ── Logging ──────────────────────────────────────────────────────────

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_tracing(
    global: &GlobalOpts,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>, CliError> {
    let console = (!global.quiet).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter(level(global.verbose)))
    });

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("ptzctl")
                .filename_suffix("log")
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter(level(global.verbose.max(1))));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(guard)
}
