//! Configuration for ptzctl.
//!
//! One TOML file (general settings, the web server, and an ordered list of
//! cameras) layered with `PTZCTL_` environment variables, plus per-camera
//! password resolution (env var, keyring, plaintext). Produces the
//! `ptzctl_core` runtime types; nothing outside this crate reads the file.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ptzctl_core::{CameraConfig, Credentials, DispatchSettings, RegistrySettings};

const KEYRING_SERVICE: &str = "ptzctl";
const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password found for camera '{camera}'")]
    NoCredentials { camera: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: General,

    #[serde(default)]
    pub webserver: Webserver,

    /// Cameras in id order: the first entry is camera 1.
    #[serde(default, rename = "camera")]
    pub cameras: Vec<CameraEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct General {
    /// Directory for the rolling log file. No file logging when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_dir: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    20
}
fn default_request_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Webserver {
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Listen on all interfaces instead of loopback only.
    #[serde(default)]
    pub remote: bool,
}

impl Default for Webserver {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            remote: false,
        }
    }
}

fn default_server_port() -> u16 {
    8080
}

/// One `[[camera]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CameraEntry {
    /// Display name; defaults to `camera-<id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub host: String,

    #[serde(default = "default_camera_port")]
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password (prefer `password_env` or the keyring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
}

fn default_camera_port() -> u16 {
    80
}

impl CameraEntry {
    /// Configured name, or the positional default for a 1-based `id`.
    pub fn display_name(&self, id: usize) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| format!("camera-{id}"), str::to_owned)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "ptzctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ptzctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load and validate the configuration.
///
/// An explicit `path` must exist; the default path may be absent, in which
/// case only defaults and environment variables apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading configuration");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("PTZCTL_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.connect_timeout_secs == 0 {
            return Err(invalid("general.connect_timeout_secs", "must be greater than 0"));
        }
        if self.general.request_timeout_secs == 0 {
            return Err(invalid("general.request_timeout_secs", "must be greater than 0"));
        }
        for (index, camera) in self.cameras.iter().enumerate() {
            let id = index + 1;
            if camera.host.trim().is_empty() {
                return Err(invalid(&format!("camera[{id}].host"), "must not be empty"));
            }
            if camera.port == 0 {
                return Err(invalid(&format!("camera[{id}].port"), "must be greater than 0"));
            }
        }
        Ok(())
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            connect_timeout: Duration::from_secs(self.general.connect_timeout_secs),
        }
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            request_timeout: Duration::from_secs(self.general.request_timeout_secs),
        }
    }

    /// Listen address for the control surface.
    pub fn bind_address(&self) -> SocketAddr {
        let ip = if self.webserver.remote {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        SocketAddr::new(ip, self.webserver.port)
    }

    /// Runtime camera configs in id order, with passwords resolved.
    ///
    /// A camera whose password cannot be found keeps its place; the reason
    /// travels with it and fails only that camera.
    pub fn camera_configs(&self) -> Vec<CameraConfig> {
        self.cameras
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let name = entry.display_name(index + 1);
                let credentials =
                    resolve_credentials(entry, &name).map_err(|e| e.to_string());
                CameraConfig {
                    name,
                    host: entry.host.trim().to_owned(),
                    port: entry.port,
                    credentials,
                }
            })
            .collect()
    }

    /// The effective configuration as TOML, with plaintext passwords masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut redacted = self.clone();
        for camera in &mut redacted.cameras {
            if camera.password.is_some() {
                camera.password = Some(REDACTED.into());
            }
        }
        Ok(toml::to_string_pretty(&redacted)?)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Username and password for one camera.
///
/// A camera without a username is reached anonymously and needs no password.
pub fn resolve_credentials(entry: &CameraEntry, name: &str) -> Result<Credentials, ConfigError> {
    resolve_credentials_with(entry, name, |var| std::env::var(var).ok())
}

fn resolve_credentials_with(
    entry: &CameraEntry,
    name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, ConfigError> {
    let username = entry.username.clone().unwrap_or_default();
    if username.is_empty() {
        return Ok(Credentials {
            username,
            password: SecretString::from(String::new()),
        });
    }

    // 1. Env var named by the camera entry
    if let Some(pw) = entry.password_env.as_deref().and_then(&env) {
        return Ok(Credentials {
            username,
            password: SecretString::from(pw),
        });
    }

    // 2. System keyring
    if let Ok(keyring_entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{name}/password")) {
        if let Ok(pw) = keyring_entry.get_password() {
            return Ok(Credentials {
                username,
                password: SecretString::from(pw),
            });
        }
    }

    // 3. Plaintext in config
    if let Some(pw) = &entry.password {
        return Ok(Credentials {
            username,
            password: SecretString::from(pw.clone()),
        });
    }

    Err(ConfigError::NoCredentials {
        camera: name.into(),
    })
}
