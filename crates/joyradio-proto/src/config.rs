use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;
use super::protocol::Action;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
    #[serde(default)]
    pub pad: PadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where the station list comes from and how it is fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub url: String,
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
    /// Skip TLS certificate verification for the catalog fetch. Insecure;
    /// only for catalog hosts with self-signed certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpvConfig {
    /// Explicit mpv binary. When unset, mpv is looked up beside the exe and on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,
    #[serde(default = "default_ipc_socket")]
    pub ipc_socket: PathBuf,
    #[serde(default = "default_volume")]
    pub initial_volume: u8,
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PadConfig {
    #[serde(default = "default_device")]
    pub device: PathBuf,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_bindings", rename = "binding")]
    pub bindings: Vec<ButtonBinding>,
}

/// `[[pad.binding]]` table: one joystick button mapped to one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub button: u8,
    pub action: Action,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            timeout_secs: default_catalog_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for MpvConfig {
    fn default() -> Self {
        Self {
            binary: None,
            ipc_socket: default_ipc_socket(),
            initial_volume: default_volume(),
            volume_step: default_volume_step(),
        }
    }
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            gateway_url: default_gateway_url(),
            request_timeout_secs: default_request_timeout(),
            bindings: default_bindings(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    platform::DEFAULT_HTTP_PORT
}

fn default_catalog_url() -> String {
    "https://xmedia.workers.dev".to_string()
}

fn default_catalog_timeout() -> u64 {
    20
}

fn default_ipc_socket() -> PathBuf {
    PathBuf::from(platform::mpv_socket_name())
}

fn default_volume() -> u8 {
    50
}

fn default_volume_step() -> u8 {
    10
}

fn default_device() -> PathBuf {
    PathBuf::from(platform::DEFAULT_DEVICE)
}

fn default_gateway_url() -> String {
    format!("http://127.0.0.1:{}", platform::DEFAULT_HTTP_PORT)
}

fn default_request_timeout() -> u64 {
    5
}

fn default_bindings() -> Vec<ButtonBinding> {
    [
        (0, Action::Play),
        (1, Action::Next),
        (2, Action::Prev),
        (3, Action::Stop),
        (6, Action::VolDown),
        (7, Action::VolUp),
    ]
    .into_iter()
    .map(|(button, action)| ButtonBinding { button, action })
    .collect()
}

impl Config {
    /// Load `config_path`, writing one with defaults if it does not exist yet.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
