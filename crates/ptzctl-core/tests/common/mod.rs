// Shared test doubles: a scriptable connector and a driver that records
// every call it receives.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ptzctl_api::{
    DeviceDriver, DeviceEndpoint, DriverConnector, Error, ImagingSettings, MoveStatus,
    PresetEntry, PtzStatus, PtzVector,
};
use ptzctl_core::{CameraConfig, Credentials};
use secrecy::SecretString;

// ── Call log ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub host: String,
    pub op: &'static str,
    pub args: String,
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn record(&self, host: &str, op: &'static str, args: String) {
        self.0.lock().unwrap().push(Call {
            host: host.to_owned(),
            op,
            args,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, host: &str, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.host == host && c.op == op)
            .count()
    }

    /// Calls made on a connected driver (everything except handshakes).
    pub fn device_calls(&self, host: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.host == host && c.op != "connect")
            .collect()
    }
}

// ── Connector ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Handshake {
    Succeed,
    Fail(&'static str),
    Delay(Duration),
    Hang,
}

#[derive(Debug, Default)]
pub struct MockConnector {
    handshakes: HashMap<String, Handshake>,
    slow_ops: HashMap<String, Duration>,
    failing_ops: Vec<String>,
    log: CallLog,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handshake(mut self, host: &str, handshake: Handshake) -> Self {
        self.handshakes.insert(host.to_owned(), handshake);
        self
    }

    /// Every device operation on `host` takes `delay` before answering.
    pub fn slow_ops(mut self, host: &str, delay: Duration) -> Self {
        self.slow_ops.insert(host.to_owned(), delay);
        self
    }

    /// Every device operation on `host` answers with a fault.
    pub fn failing_ops(mut self, host: &str) -> Self {
        self.failing_ops.push(host.to_owned());
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl DriverConnector for MockConnector {
    type Driver = MockDriver;

    async fn connect(&self, endpoint: &DeviceEndpoint) -> Result<MockDriver, Error> {
        self.log.record(&endpoint.host, "connect", endpoint.address());
        let handshake = self
            .handshakes
            .get(&endpoint.host)
            .cloned()
            .unwrap_or(Handshake::Succeed);
        match handshake {
            Handshake::Succeed => {}
            Handshake::Fail(message) => {
                return Err(Error::Protocol {
                    message: message.to_owned(),
                });
            }
            Handshake::Delay(delay) => tokio::time::sleep(delay).await,
            Handshake::Hang => std::future::pending::<()>().await,
        }
        Ok(MockDriver {
            host: endpoint.host.clone(),
            delay: self.slow_ops.get(&endpoint.host).copied(),
            fail: self.failing_ops.contains(&endpoint.host),
            log: self.log.clone(),
        })
    }
}

// ── Driver ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MockDriver {
    host: String,
    delay: Option<Duration>,
    fail: bool,
    log: CallLog,
}

impl MockDriver {
    async fn call(&self, op: &'static str, args: String) -> Result<(), Error> {
        self.log.record(&self.host, op, args);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::Fault {
                code: "ter:ActionNotSupported".into(),
                reason: format!("{op} refused"),
            });
        }
        Ok(())
    }
}

fn vector(v: PtzVector) -> String {
    format!("{},{},{}", v.pan, v.tilt, v.zoom)
}

impl DeviceDriver for MockDriver {
    async fn status(&self) -> Result<PtzStatus, Error> {
        self.call("status", String::new()).await?;
        Ok(PtzStatus {
            position: Some(PtzVector::new(0.1, 0.2, 0.0)),
            move_status: MoveStatus {
                pan_tilt: Some("IDLE".into()),
                zoom: Some("IDLE".into()),
            },
            utc_time: None,
        })
    }

    async fn continuous_move(&self, velocity: PtzVector) -> Result<(), Error> {
        self.call("continuous_move", vector(velocity)).await
    }

    async fn stop(&self) -> Result<(), Error> {
        self.call("stop", String::new()).await
    }

    async fn goto_preset(&self, token: &str, speed: Option<PtzVector>) -> Result<(), Error> {
        let speed = speed.map(vector).unwrap_or_else(|| "default".into());
        self.call("goto_preset", format!("{token}@{speed}")).await
    }

    async fn goto_home(&self) -> Result<(), Error> {
        self.call("goto_home", String::new()).await
    }

    async fn presets(&self) -> Result<Vec<PresetEntry>, Error> {
        self.call("presets", String::new()).await?;
        Ok(["10", "2", "1"]
            .into_iter()
            .map(|t| PresetEntry {
                token: t.into(),
                name: format!("Preset {t}"),
            })
            .collect())
    }

    async fn set_preset(&self, token: &str, name: &str) -> Result<(), Error> {
        self.call("set_preset", format!("{token}={name}")).await
    }

    async fn remove_preset(&self, token: &str) -> Result<(), Error> {
        self.call("remove_preset", token.to_owned()).await
    }

    async fn focus_move(&self, speed: f64) -> Result<(), Error> {
        self.call("focus_move", speed.to_string()).await
    }

    async fn focus_stop(&self) -> Result<(), Error> {
        self.call("focus_stop", String::new()).await
    }

    async fn imaging_settings(&self) -> Result<ImagingSettings, Error> {
        self.call("imaging_settings", String::new()).await?;
        Ok(ImagingSettings {
            brightness: Some(50.0),
            ..ImagingSettings::default()
        })
    }

    async fn set_imaging_settings(&self, settings: &ImagingSettings) -> Result<(), Error> {
        self.call("set_imaging_settings", format!("{settings:?}")).await
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn camera(name: &str, host: &str) -> CameraConfig {
    CameraConfig {
        name: name.to_owned(),
        host: host.to_owned(),
        port: 80,
        credentials: Ok(Credentials {
            username: "admin".into(),
            password: SecretString::from("secret".to_owned()),
        }),
    }
}
