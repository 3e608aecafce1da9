//! Output formatting: table, JSON, plain.
//!
//! Also owns the JSON shape of command results, which the HTTP control
//! surface serves verbatim.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::{Value, json};
use tabled::{Table, Tabled, settings::Style};

use ptzctl_api::{ImagingSettings, PresetEntry, PtzStatus};
use ptzctl_core::{CameraSnapshot, CommandResult, ConnectionState};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── JSON shapes ──────────────────────────────────────────────────────

/// The JSON body for a successful command.
///
/// Plain commands answer `{"ok": true}`; presets are `[{"name", "num"}]`.
pub fn result_json(result: &CommandResult) -> Result<Value, serde_json::Error> {
    Ok(match result {
        CommandResult::Ok => json!({ "ok": true }),
        CommandResult::Status(status) => serde_json::to_value(status)?,
        CommandResult::Presets(presets) => Value::Array(
            presets
                .iter()
                .map(|p| json!({ "name": p.name, "num": p.token }))
                .collect(),
        ),
        CommandResult::Imaging(settings) => serde_json::to_value(settings)?,
    })
}

fn render_json(value: &Value, compact: bool) -> String {
    if compact {
        value.to_string()
    } else {
        format!("{value:#}")
    }
}

// ── Command results ──────────────────────────────────────────────────

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Num")]
    num: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub fn render_result(format: OutputFormat, result: &CommandResult) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => return Ok(render_json(&result_json(result)?, false)),
        OutputFormat::JsonCompact => return Ok(render_json(&result_json(result)?, true)),
        OutputFormat::Table | OutputFormat::Plain => {}
    }

    Ok(match result {
        CommandResult::Ok => "ok".to_owned(),
        CommandResult::Status(status) => status_detail(status),
        CommandResult::Presets(presets) if format == OutputFormat::Plain => presets
            .iter()
            .map(|p| p.token.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        CommandResult::Presets(presets) => preset_table(presets),
        CommandResult::Imaging(settings) => imaging_detail(settings),
    })
}

fn preset_table(presets: &[PresetEntry]) -> String {
    let rows: Vec<PresetRow> = presets
        .iter()
        .map(|p| PresetRow {
            num: p.token.clone(),
            name: p.name.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn status_detail(status: &PtzStatus) -> String {
    let mut lines = Vec::new();
    match status.position {
        Some(p) => lines.push(format!(
            "Position:  pan {:.3}  tilt {:.3}  zoom {:.3}",
            p.pan, p.tilt, p.zoom
        )),
        None => lines.push("Position:  unknown".to_owned()),
    }
    let unknown = "UNKNOWN";
    lines.push(format!(
        "Pan/tilt:  {}",
        status.move_status.pan_tilt.as_deref().unwrap_or(unknown)
    ));
    lines.push(format!(
        "Zoom:      {}",
        status.move_status.zoom.as_deref().unwrap_or(unknown)
    ));
    if let Some(time) = &status.utc_time {
        lines.push(format!("UTC time:  {time}"));
    }
    lines.join("\n")
}

fn imaging_detail(settings: &ImagingSettings) -> String {
    let field = |label: &str, value: Option<f64>| {
        let value = value.map_or_else(|| "-".to_owned(), |v| v.to_string());
        format!("{label:<18}{value}")
    };
    [
        field("Brightness:", settings.brightness),
        field("Color saturation:", settings.color_saturation),
        field("Contrast:", settings.contrast),
        field("Sharpness:", settings.sharpness),
    ]
    .join("\n")
}

// ── Camera listing ───────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Error")]
    error: String,
}

pub fn render_cameras(
    format: OutputFormat,
    cameras: &[CameraSnapshot],
    color: bool,
) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Json => render_json(&serde_json::to_value(cameras)?, false),
        OutputFormat::JsonCompact => render_json(&serde_json::to_value(cameras)?, true),
        OutputFormat::Plain => cameras
            .iter()
            .map(|c| format!("{}\t{}\t{}", c.id, c.name, c.state))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Table => {
            let rows: Vec<CameraRow> = cameras
                .iter()
                .map(|c| CameraRow {
                    id: c.id.to_string(),
                    name: c.name.clone(),
                    address: format!("{}:{}", c.host, c.port),
                    state: paint_state(c.state, color),
                    error: c.last_error.clone().unwrap_or_default(),
                })
                .collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
    })
}

fn paint_state(state: ConnectionState, color: bool) -> String {
    let label = state.to_string();
    if !color {
        return label;
    }
    match state {
        ConnectionState::Connected => label.green().to_string(),
        ConnectionState::Connecting => label.yellow().to_string(),
        ConnectionState::Failed => label.red().to_string(),
    }
}
