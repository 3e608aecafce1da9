// ── Legacy CGI decoder ──
//
// Third-party PTZ panels send `ptzctrl.cgi?ptzcmd&<action>&<magnitude>...`.
// Magnitudes are raw panel integers (about 0..255) scaled down by a fixed
// divisor per action. The panel's right/up are the negative pan/tilt
// directions of the normalized space.

use crate::command::Command;
use crate::error::TranslationError;

const PTZCMD: &str = "ptzcmd";

const PAN_DIVISOR: i32 = 20;
const TILT_DIVISOR: i32 = 15;
const ZOOM_DIVISOR: i32 = 7;
const FOCUS_DIVISOR: i32 = 7;

/// Decode one `&`-separated legacy argument list.
///
/// Tokens after the magnitude are ignored.
pub fn parse_legacy(args: &str) -> Result<Command, TranslationError> {
    let mut tokens = args.split('&');
    if tokens.next() != Some(PTZCMD) {
        return Err(TranslationError::NotPtzCommand {
            args: args.to_owned(),
        });
    }

    let action = tokens
        .next()
        .filter(|a| !a.is_empty())
        .ok_or(TranslationError::MissingAction)?;
    let arg = tokens.next();

    let command = match action {
        "poscall" => {
            let index = magnitude(action, arg)?;
            if index < 1 {
                return Err(TranslationError::InvalidPresetIndex { index });
            }
            Command::GotoPreset {
                token: (index - 1).to_string(),
                velocity: None,
            }
        }
        "right" => pan(-scaled(magnitude(action, arg)?, PAN_DIVISOR)),
        "left" => pan(scaled(magnitude(action, arg)?, PAN_DIVISOR)),
        "up" => tilt(-scaled(magnitude(action, arg)?, TILT_DIVISOR)),
        "down" => tilt(scaled(magnitude(action, arg)?, TILT_DIVISOR)),
        "zoomin" => zoom(scaled(magnitude(action, arg)?, ZOOM_DIVISOR)),
        "zoomout" => zoom(-scaled(magnitude(action, arg)?, ZOOM_DIVISOR)),
        "zoomstop" | "ptzstop" => Command::Stop,
        "focusin" => Command::FocusMove {
            speed: scaled(magnitude(action, arg)?, FOCUS_DIVISOR),
        },
        "focusout" => Command::FocusMove {
            speed: -scaled(magnitude(action, arg)?, FOCUS_DIVISOR),
        },
        "focusstop" => Command::FocusStop,
        "home" => Command::Home,
        other => {
            return Err(TranslationError::UnrecognizedCommand {
                action: other.to_owned(),
            });
        }
    };
    Ok(command)
}

fn magnitude(action: &str, arg: Option<&str>) -> Result<i32, TranslationError> {
    let raw = arg
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| TranslationError::MissingArgument {
            action: action.to_owned(),
        })?;
    raw.parse().map_err(|_| TranslationError::InvalidArgument {
        action: action.to_owned(),
        value: raw.to_owned(),
    })
}

/// Integer division, truncating toward zero, widened after the fact.
fn scaled(raw: i32, divisor: i32) -> f64 {
    f64::from(raw / divisor)
}

fn pan(pan: f64) -> Command {
    Command::Move {
        pan,
        tilt: 0.0,
        zoom: 0.0,
    }
}

fn tilt(tilt: f64) -> Command {
    Command::Move {
        pan: 0.0,
        tilt,
        zoom: 0.0,
    }
}

fn zoom(zoom: f64) -> Command {
    Command::Move {
        pan: 0.0,
        tilt: 0.0,
        zoom,
    }
}
