// `DeviceDriver` over the ONVIF PTZ and imaging services.

use tracing::debug;
use url::Url;

use super::client::{Service, SoapClient};
use super::xml::{Element, escape};
use crate::driver::DeviceDriver;
use crate::error::Error;
use crate::models::{ImagingSettings, MoveStatus, PresetEntry, PtzStatus, PtzVector};

/// A connected ONVIF camera bound to its first media profile.
#[derive(Debug)]
pub struct OnvifDriver {
    soap: SoapClient,
    ptz_url: Url,
    imaging_url: Option<Url>,
    profile_token: String,
    video_source: Option<String>,
}

impl OnvifDriver {
    pub(crate) fn new(
        soap: SoapClient,
        ptz_url: Url,
        imaging_url: Option<Url>,
        profile_token: String,
        video_source: Option<String>,
    ) -> Self {
        Self {
            soap,
            ptz_url,
            imaging_url,
            profile_token,
            video_source,
        }
    }

    /// Media profile every PTZ request is issued against.
    pub fn profile_token(&self) -> &str {
        &self.profile_token
    }

    pub fn video_source_token(&self) -> Option<&str> {
        self.video_source.as_deref()
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn ptz(&self, operation: &str, extra: &str) -> Result<Element, Error> {
        let inner = format!(
            "<tptz:ProfileToken>{}</tptz:ProfileToken>{extra}",
            escape(&self.profile_token)
        );
        self.soap
            .call(&self.ptz_url, Service::Ptz, operation, &inner)
            .await
    }

    async fn imaging(&self, operation: &str, extra: &str) -> Result<Element, Error> {
        let (Some(url), Some(source)) = (&self.imaging_url, &self.video_source) else {
            return Err(Error::UnsupportedOperation("imaging service"));
        };
        let inner = format!(
            "<timg:VideoSourceToken>{}</timg:VideoSourceToken>{extra}",
            escape(source)
        );
        self.soap
            .call(url, Service::Imaging, operation, &inner)
            .await
    }

    pub(crate) async fn read_status(&self) -> Result<PtzStatus, Error> {
        let body = self.ptz("GetStatus", "").await?;
        parse_status(&body)
    }
}

impl DeviceDriver for OnvifDriver {
    async fn status(&self) -> Result<PtzStatus, Error> {
        self.read_status().await
    }

    async fn continuous_move(&self, velocity: PtzVector) -> Result<(), Error> {
        let velocity = vector_xml(velocity.clamped());
        self.ptz(
            "ContinuousMove",
            &format!("<tptz:Velocity>{velocity}</tptz:Velocity>"),
        )
        .await?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), Error> {
        self.ptz(
            "Stop",
            "<tptz:PanTilt>true</tptz:PanTilt><tptz:Zoom>true</tptz:Zoom>",
        )
        .await?;
        Ok(())
    }

    async fn goto_preset(&self, token: &str, speed: Option<PtzVector>) -> Result<(), Error> {
        let mut extra = format!("<tptz:PresetToken>{}</tptz:PresetToken>", escape(token));
        if let Some(speed) = speed {
            extra.push_str(&format!(
                "<tptz:Speed>{}</tptz:Speed>",
                vector_xml(speed.clamped())
            ));
        }
        self.ptz("GotoPreset", &extra).await?;
        Ok(())
    }

    async fn goto_home(&self) -> Result<(), Error> {
        self.ptz("GotoHomePosition", "").await?;
        Ok(())
    }

    async fn presets(&self) -> Result<Vec<PresetEntry>, Error> {
        let body = self.ptz("GetPresets", "").await?;
        Ok(parse_presets(&body))
    }

    async fn set_preset(&self, token: &str, name: &str) -> Result<(), Error> {
        let extra = format!(
            "<tptz:PresetName>{}</tptz:PresetName><tptz:PresetToken>{}</tptz:PresetToken>",
            escape(name),
            escape(token)
        );
        self.ptz("SetPreset", &extra).await?;
        Ok(())
    }

    async fn remove_preset(&self, token: &str) -> Result<(), Error> {
        let extra = format!("<tptz:PresetToken>{}</tptz:PresetToken>", escape(token));
        self.ptz("RemovePreset", &extra).await?;
        Ok(())
    }

    async fn focus_move(&self, speed: f64) -> Result<(), Error> {
        // Continuous focus is refused while autofocus is active.
        self.imaging(
            "SetImagingSettings",
            "<timg:ImagingSettings><tt:Focus><tt:AutoFocusMode>MANUAL</tt:AutoFocusMode>\
             </tt:Focus></timg:ImagingSettings>",
        )
        .await?;

        let speed = speed.clamp(-1.0, 1.0);
        debug!(speed, "focus move");
        self.imaging(
            "Move",
            &format!(
                "<timg:Focus><tt:Continuous><tt:Speed>{speed}</tt:Speed></tt:Continuous></timg:Focus>"
            ),
        )
        .await?;
        Ok(())
    }

    async fn focus_stop(&self) -> Result<(), Error> {
        self.imaging("Stop", "").await?;
        Ok(())
    }

    async fn imaging_settings(&self) -> Result<ImagingSettings, Error> {
        let body = self.imaging("GetImagingSettings", "").await?;
        parse_imaging(&body)
    }

    async fn set_imaging_settings(&self, settings: &ImagingSettings) -> Result<(), Error> {
        let mut fields = String::new();
        // Schema order: Brightness, ColorSaturation, Contrast, ..., Sharpness.
        for (tag, value) in [
            ("Brightness", settings.brightness),
            ("ColorSaturation", settings.color_saturation),
            ("Contrast", settings.contrast),
            ("Sharpness", settings.sharpness),
        ] {
            if let Some(value) = value {
                fields.push_str(&format!("<tt:{tag}>{value}</tt:{tag}>"));
            }
        }
        self.imaging(
            "SetImagingSettings",
            &format!(
                "<timg:ImagingSettings>{fields}</timg:ImagingSettings>\
                 <timg:ForcePersistence>true</timg:ForcePersistence>"
            ),
        )
        .await?;
        Ok(())
    }
}

// ── Encoding / decoding ─────────────────────────────────────────────

fn vector_xml(v: PtzVector) -> String {
    format!(
        r#"<tt:PanTilt x="{}" y="{}"/><tt:Zoom x="{}"/>"#,
        v.pan, v.tilt, v.zoom
    )
}

fn parse_status(body: &Element) -> Result<PtzStatus, Error> {
    let status = body
        .child("PTZStatus")
        .ok_or_else(|| Error::protocol("GetStatus response has no PTZStatus"))?;

    let position = status.child("Position").and_then(|pos| {
        let pan_tilt = pos.child("PanTilt");
        let zoom = pos.child("Zoom");
        if pan_tilt.is_none() && zoom.is_none() {
            return None;
        }
        Some(PtzVector::new(
            pan_tilt.and_then(|e| e.attr_f64("x")).unwrap_or_default(),
            pan_tilt.and_then(|e| e.attr_f64("y")).unwrap_or_default(),
            zoom.and_then(|e| e.attr_f64("x")).unwrap_or_default(),
        ))
    });

    let move_status = status
        .child("MoveStatus")
        .map(|m| MoveStatus {
            pan_tilt: m.child_text("PanTilt"),
            zoom: m.child_text("Zoom"),
        })
        .unwrap_or_default();

    Ok(PtzStatus {
        position,
        move_status,
        utc_time: status.child_text("UtcTime"),
    })
}

fn parse_presets(body: &Element) -> Vec<PresetEntry> {
    body.children_named("Preset")
        .into_iter()
        .filter_map(|p| {
            Some(PresetEntry {
                token: p.attr("token")?.to_owned(),
                name: p.child_text("Name").unwrap_or_default(),
            })
        })
        .collect()
}

fn parse_imaging(body: &Element) -> Result<ImagingSettings, Error> {
    let settings = body
        .child("ImagingSettings")
        .ok_or_else(|| Error::protocol("GetImagingSettings response has no ImagingSettings"))?;
    let number = |tag: &str| settings.child_text(tag).and_then(|t| t.parse().ok());
    Ok(ImagingSettings {
        brightness: number("Brightness"),
        color_saturation: number("ColorSaturation"),
        contrast: number("Contrast"),
        sharpness: number("Sharpness"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::onvif::xml::parse_body;

    #[test]
    fn status_without_position_still_reports_move_state() {
        let body = parse_body(
            "<tptz:GetStatusResponse><tptz:PTZStatus><tt:MoveStatus>\
             <tt:PanTilt>MOVING</tt:PanTilt></tt:MoveStatus></tptz:PTZStatus>\
             </tptz:GetStatusResponse>",
        );
        let status = parse_status(&body).unwrap();
        assert!(status.position.is_none());
        assert_eq!(status.move_status.pan_tilt.as_deref(), Some("MOVING"));
        assert!(status.move_status.zoom.is_none());
    }

    #[test]
    fn status_requires_ptz_status_element() {
        let err = parse_status(&parse_body("<tptz:GetStatusResponse/>")).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn presets_without_token_are_skipped() {
        let body = parse_body(
            r#"<tptz:GetPresetsResponse>
                 <tptz:Preset><tt:Name>orphan</tt:Name></tptz:Preset>
                 <tptz:Preset token="3"><tt:Name>dock</tt:Name></tptz:Preset>
               </tptz:GetPresetsResponse>"#,
        );
        assert_eq!(
            parse_presets(&body),
            vec![PresetEntry {
                token: "3".into(),
                name: "dock".into()
            }]
        );
    }

    #[test]
    fn preset_names_are_decoded_and_commented_presets_do_not_exist() {
        let body = parse_body(
            r#"<tptz:GetPresetsResponse>
                 <tptz:Preset token="1"><tt:Name>Caf&#233; &#x26; Bar</tt:Name></tptz:Preset>
                 <tptz:Preset token="2"><tt:Name><![CDATA[Stage <L>]]></tt:Name></tptz:Preset>
                 <!-- <tptz:Preset token="99"><tt:Name>commented out</tt:Name></tptz:Preset> -->
               </tptz:GetPresetsResponse>"#,
        );
        assert_eq!(
            parse_presets(&body),
            vec![
                PresetEntry {
                    token: "1".into(),
                    name: "Café & Bar".into()
                },
                PresetEntry {
                    token: "2".into(),
                    name: "Stage <L>".into()
                },
            ]
        );
    }

    #[test]
    fn imaging_ignores_fields_the_device_omits() {
        let body = parse_body(
            "<timg:GetImagingSettingsResponse><timg:ImagingSettings>\
             <tt:Brightness>55</tt:Brightness><tt:Sharpness>bogus</tt:Sharpness>\
             </timg:ImagingSettings></timg:GetImagingSettingsResponse>",
        );
        let settings = parse_imaging(&body).unwrap();
        assert_eq!(settings.brightness, Some(55.0));
        assert_eq!(settings.sharpness, None);
        assert_eq!(settings.contrast, None);
    }

    #[test]
    fn vectors_encode_as_pan_tilt_and_zoom() {
        assert_eq!(
            vector_xml(PtzVector::new(0.5, -1.0, 0.0)),
            r#"<tt:PanTilt x="0.5" y="-1"/><tt:Zoom x="0"/>"#
        );
    }
}
