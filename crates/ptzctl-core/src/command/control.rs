// ── Structured control-API decoder ──
//
// `/control/<operation>?key=value...` requests. Every operation has a fixed
// parameter list; anything outside it is rejected rather than ignored.

use std::collections::BTreeMap;

use ptzctl_api::{ImagingSettings, PtzVector};

use crate::command::Command;
use crate::error::TranslationError;

const IMAGING_FIELDS: [&str; 4] = ["brightness", "color_saturation", "contrast", "sharpness"];

/// Decode a named operation and its query parameters.
///
/// Repeated keys keep the last value. The caller strips its own routing
/// parameters (`camera`) first.
pub fn parse_structured<I, K, V>(name: &str, params: I) -> Result<Command, TranslationError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
        .collect();
    let args = Params { operation: name, params };

    let command = match name {
        "move" => {
            args.only(&["pan", "tilt", "zoom"])?;
            Command::Move {
                pan: args.float("pan")?.unwrap_or(0.0),
                tilt: args.float("tilt")?.unwrap_or(0.0),
                zoom: args.float("zoom")?.unwrap_or(0.0),
            }
        }
        "gotoPreset" => {
            args.only(&["preset", "velocity"])?;
            Command::GotoPreset {
                token: args.required("preset")?,
                velocity: args.vector("velocity")?,
            }
        }
        "stop" => args.none(Command::Stop)?,
        "home" => args.none(Command::Home)?,
        "focus" => {
            args.only(&["speed"])?;
            Command::FocusMove {
                speed: args.float("speed")?.unwrap_or(1.0),
            }
        }
        "focusstop" => args.none(Command::FocusStop)?,
        "get_status" => args.none(Command::GetStatus)?,
        "get_presets" => args.none(Command::GetPresets)?,
        "set_preset" => {
            args.only(&["preset", "name"])?;
            let token = args.required("preset")?;
            let name = args.text("name").unwrap_or_else(|| token.clone());
            Command::SetPreset { token, name }
        }
        "remove_preset" => {
            args.only(&["preset"])?;
            Command::RemovePreset {
                token: args.required("preset")?,
            }
        }
        "get_imaging" => args.none(Command::GetImaging)?,
        "set_imaging" => {
            args.only(&IMAGING_FIELDS)?;
            let settings = ImagingSettings {
                brightness: args.float("brightness")?,
                color_saturation: args.float("color_saturation")?,
                contrast: args.float("contrast")?,
                sharpness: args.float("sharpness")?,
            };
            if settings.is_empty() {
                return Err(TranslationError::MissingParameter {
                    operation: name.to_owned(),
                    param: "brightness, color_saturation, contrast or sharpness",
                });
            }
            Command::SetImaging(settings)
        }
        other => {
            return Err(TranslationError::UnknownOperation {
                name: other.to_owned(),
            });
        }
    };
    Ok(command)
}

struct Params<'a> {
    operation: &'a str,
    params: BTreeMap<String, String>,
}

impl Params<'_> {
    fn only(&self, allowed: &[&str]) -> Result<(), TranslationError> {
        match self.params.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(param) => Err(TranslationError::UnexpectedParameter {
                operation: self.operation.to_owned(),
                param: param.clone(),
            }),
            None => Ok(()),
        }
    }

    fn none(&self, command: Command) -> Result<Command, TranslationError> {
        self.only(&[])?;
        Ok(command)
    }

    fn text(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, TranslationError> {
        self.text(key)
            .ok_or_else(|| TranslationError::MissingParameter {
                operation: self.operation.to_owned(),
                param: key,
            })
    }

    fn invalid(&self, key: &str, value: &str) -> TranslationError {
        TranslationError::InvalidParameter {
            operation: self.operation.to_owned(),
            param: key.to_owned(),
            value: value.to_owned(),
        }
    }

    fn float(&self, key: &str) -> Result<Option<f64>, TranslationError> {
        let Some(raw) = self.text(key) else {
            return Ok(None);
        };
        parse_finite(&raw)
            .map(Some)
            .ok_or_else(|| self.invalid(key, &raw))
    }

    /// `"p,t,z"`, or one number applied to all three axes.
    fn vector(&self, key: &str) -> Result<Option<PtzVector>, TranslationError> {
        let Some(raw) = self.text(key) else {
            return Ok(None);
        };
        let parts: Option<Vec<f64>> = raw.split(',').map(parse_finite).collect();
        match parts.as_deref() {
            Some(&[v]) => Ok(Some(PtzVector::new(v, v, v))),
            Some(&[pan, tilt, zoom]) => Ok(Some(PtzVector::new(pan, tilt, zoom))),
            _ => Err(self.invalid(key, &raw)),
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
