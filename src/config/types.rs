//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::defaults::*;
use super::terminal::TerminalConfig;
use crate::security::AppContext;
use crate::terminal::types::Channel;
use orb_ait::Application;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bridge identity, listener and feature switches.
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Applications known to the application manager.
    #[serde(default)]
    pub apps: Vec<AppConfig>,
    /// Broadcast services offered by the mock terminal.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    /// Seed values for the mock terminal.
    #[serde(default)]
    pub terminal: TerminalConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn app(&self, app_id: u32) -> Option<&AppConfig> {
        self.apps.iter().find(|a| a.app_id == app_id)
    }

    /// Applications signalled on `channel`, in declaration order.
    /// Unknown ids are skipped; validation reports them.
    pub fn channel_applications(&self, channel: &ChannelConfig) -> Vec<Application> {
        channel
            .applications
            .iter()
            .filter_map(|id| self.app(*id))
            .map(AppConfig::to_application)
            .collect()
    }
}

/// Bridge daemon settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_name")]
    pub name: String,
    /// JSON-lines gateway address.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    pub metrics_port: Option<u16>,
    /// Register the `Debug.*` methods.
    #[serde(default = "default_test_reports")]
    pub test_reports: bool,
    /// PID the synthetic AIT is signalled on.
    #[serde(default = "default_ait_pid")]
    pub ait_pid: u16,
    /// Channel tuned at startup, by ccid.
    pub initial_channel: Option<String>,
    /// Events buffered per gateway client before the oldest are dropped.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: default_bridge_name(),
            listen: default_listen(),
            metrics_port: None,
            test_reports: default_test_reports(),
            ait_pid: default_ait_pid(),
            initial_channel: None,
            event_buffer: default_event_buffer(),
        }
    }
}

/// An application the application manager can launch.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub app_id: u32,
    pub org_id: u64,
    pub base_url: String,
    #[serde(default)]
    pub initial_path: String,
    /// Security origin bound into the application's tokens.
    pub origin: String,
    #[serde(default = "default_true")]
    pub broadcast_related: bool,
    #[serde(default)]
    pub transitioning: bool,
    #[serde(default)]
    pub trusted: bool,
}

impl AppConfig {
    /// Resource URI of the application's entry document.
    pub fn uri(&self) -> String {
        format!("{}{}", self.base_url, self.initial_path)
    }

    pub fn to_application(&self) -> Application {
        Application::new(
            self.app_id,
            self.org_id,
            self.name.clone(),
            self.base_url.clone(),
            self.initial_path.clone(),
        )
    }

    pub fn context(&self) -> AppContext {
        AppContext {
            uri: self.uri(),
            broadcast_related: self.broadcast_related,
            transitioning: self.transitioning,
            trusted: self.trusted,
        }
    }
}

/// A broadcast service and the applications it signals.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub ccid: String,
    pub name: String,
    #[serde(default)]
    pub channel_type: i32,
    #[serde(default = "default_id_type")]
    pub id_type: i32,
    pub onid: u16,
    pub tsid: u16,
    pub sid: u16,
    #[serde(default)]
    pub major_channel: u32,
    /// App ids carried in this service's AIT.
    #[serde(default)]
    pub applications: Vec<u32>,
}

impl ChannelConfig {
    pub fn to_channel(&self) -> Channel {
        Channel {
            ccid: self.ccid.clone(),
            name: self.name.clone(),
            channel_type: self.channel_type,
            id_type: self.id_type,
            onid: self.onid,
            tsid: self.tsid,
            sid: self.sid,
            major_channel: self.major_channel,
            ip_broadcast_id: None,
            hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.bridge.name, "orbd");
        assert_eq!(config.bridge.ait_pid, 0x1F5);
        assert_eq!(config.bridge.listen.port(), 8910);
        assert!(config.apps.is_empty());
        assert_eq!(config.terminal.country_id, "GBR");
    }

    #[test]
    fn test_app_and_channel_blocks() {
        let toml = r#"
[bridge]
name = "lab"
test_reports = false
ait_pid = 0x100

[[apps]]
name = "Red Button"
app_id = 1
org_id = 999
base_url = "http://apps.example.tv/red/"
initial_path = "index.html"
origin = "http://apps.example.tv"

[[channels]]
ccid = "ccid:dvbt.1"
name = "One"
onid = 9018
tsid = 4100
sid = 4164
applications = [1]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.bridge.test_reports);
        assert_eq!(config.bridge.ait_pid, 0x100);

        let app = config.app(1).unwrap();
        assert_eq!(app.uri(), "http://apps.example.tv/red/index.html");
        assert!(app.broadcast_related);
        assert!(!app.trusted);

        let channel = &config.channels[0];
        assert_eq!(channel.id_type, 12);
        let apps = config.channel_applications(channel);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].org_id, 999);
        assert_eq!(channel.to_channel().sid, 4164);
    }
}
