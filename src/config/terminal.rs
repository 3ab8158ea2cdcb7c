//! Mock terminal seed configuration.

use serde::Deserialize;
use std::collections::HashMap;

use super::defaults::*;
use crate::terminal::types::LocalSystem;

/// Values the mock terminal reports and the switches that steer it.
#[derive(Debug, Clone, Deserialize)]
pub struct TerminalConfig {
    #[serde(default = "default_local_system")]
    pub local_system: LocalSystem,
    #[serde(default = "default_country_id")]
    pub country_id: String,
    #[serde(default = "default_language")]
    pub audio_language: String,
    #[serde(default = "default_language")]
    pub subtitle_language: String,
    #[serde(default = "default_language")]
    pub ui_language: String,
    #[serde(default)]
    pub subtitles_enabled: bool,
    #[serde(default)]
    pub audio_description_enabled: bool,
    /// Mixed into every distinctive identifier.
    #[serde(default = "default_device_id")]
    pub device_id: String,
    /// Outcome of the simulated consent prompt.
    #[serde(default = "default_true")]
    pub grant_distinctive_identifier: bool,
    #[serde(default = "default_display_width")]
    pub display_width: u32,
    #[serde(default = "default_display_height")]
    pub display_height: u32,
    #[serde(default = "default_parental_scheme")]
    pub parental_scheme: String,
    /// Minimum age blocked without a PIN.
    #[serde(default = "default_parental_threshold")]
    pub parental_threshold: i32,
    #[serde(default = "default_drm_systems")]
    pub drm_systems: Vec<DrmSystemConfig>,
    /// Static name table for `Network.resolveHostAddress`.
    #[serde(default)]
    pub hosts: HashMap<String, String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            local_system: default_local_system(),
            country_id: default_country_id(),
            audio_language: default_language(),
            subtitle_language: default_language(),
            ui_language: default_language(),
            subtitles_enabled: false,
            audio_description_enabled: false,
            device_id: default_device_id(),
            grant_distinctive_identifier: true,
            display_width: default_display_width(),
            display_height: default_display_height(),
            parental_scheme: default_parental_scheme(),
            parental_threshold: default_parental_threshold(),
            drm_systems: default_drm_systems(),
            hosts: HashMap::new(),
        }
    }
}

/// A DRM system the mock reports as ready.
#[derive(Debug, Clone, Deserialize)]
pub struct DrmSystemConfig {
    pub system_id: String,
    #[serde(default)]
    pub protection_gateways: String,
    #[serde(default)]
    pub supported_formats: String,
}

fn default_local_system() -> LocalSystem {
    LocalSystem {
        vendor_name: "ORB".to_string(),
        model_name: "orbd".to_string(),
        family_name: "mock".to_string(),
        software_version: env!("CARGO_PKG_VERSION").to_string(),
        hardware_version: "1.0".to_string(),
    }
}

fn default_drm_systems() -> Vec<DrmSystemConfig> {
    vec![DrmSystemConfig {
        system_id: "urn:dvb:casystemid:19188".to_string(),
        protection_gateways: "dvb-cenc".to_string(),
        supported_formats: "video/mp4".to_string(),
    }]
}
