//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use orb_ait::{AitVersion, encode_section};
use std::collections::HashSet;
use thiserror::Error;

/// Largest 13-bit transport stream PID.
const MAX_PID: u16 = 0x1FFF;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bridge.name is required")]
    MissingBridgeName,
    #[error("bridge.ait_pid must be at most 0x1FFF, got {0:#x}")]
    InvalidAitPid(u16),
    #[error("bridge.initial_channel '{0}' is not a configured channel")]
    UnknownInitialChannel(String),
    #[error("apps[{0}].name is required")]
    EmptyAppName(u32),
    #[error("app_id {0} is configured more than once")]
    DuplicateAppId(u32),
    #[error("app {app_id} cannot be signalled: {reason}")]
    InvalidApplication { app_id: u32, reason: String },
    #[error("channels.ccid is required")]
    EmptyCcid,
    #[error("channel '{0}' is configured more than once")]
    DuplicateCcid(String),
    #[error("channel '{ccid}' signals unknown app_id {app_id}")]
    UnknownChannelApp { ccid: String, app_id: u32 },
    #[error("channel '{ccid}' AIT cannot be encoded: {reason}")]
    ChannelAit { ccid: String, reason: String },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bridge.name.is_empty() {
        errors.push(ValidationError::MissingBridgeName);
    }
    if config.bridge.ait_pid > MAX_PID {
        errors.push(ValidationError::InvalidAitPid(config.bridge.ait_pid));
    }

    // Applications
    let mut app_ids = HashSet::new();
    for app in &config.apps {
        if app.name.is_empty() {
            errors.push(ValidationError::EmptyAppName(app.app_id));
        }
        if !app_ids.insert(app.app_id) {
            errors.push(ValidationError::DuplicateAppId(app.app_id));
        }
        if let Err(e) = app.to_application().validate() {
            errors.push(ValidationError::InvalidApplication {
                app_id: app.app_id,
                reason: e.to_string(),
            });
        }
    }

    // Channels
    let mut ccids = HashSet::new();
    for channel in &config.channels {
        if channel.ccid.is_empty() {
            errors.push(ValidationError::EmptyCcid);
        } else if !ccids.insert(channel.ccid.as_str()) {
            errors.push(ValidationError::DuplicateCcid(channel.ccid.clone()));
        }

        let mut all_known = true;
        for app_id in &channel.applications {
            if !app_ids.contains(app_id) {
                all_known = false;
                errors.push(ValidationError::UnknownChannelApp {
                    ccid: channel.ccid.clone(),
                    app_id: *app_id,
                });
            }
        }

        // Per-application bounds are reported above; this catches lists
        // whose combined loop or section length overflows.
        let apps = config.channel_applications(channel);
        if all_known
            && apps.iter().all(|a| a.validate().is_ok())
            && let Err(e) = encode_section(&apps, AitVersion::default())
        {
            errors.push(ValidationError::ChannelAit {
                ccid: channel.ccid.clone(),
                reason: e.to_string(),
            });
        }
    }

    if let Some(ref initial) = config.bridge.initial_channel
        && !config.channels.iter().any(|c| &c.ccid == initial)
    {
        errors.push(ValidationError::UnknownInitialChannel(initial.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[bridge]
name = "orbd-test"

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
"#
        .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        let config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_bridge_name_fails() {
        let toml = minimal_valid_config().replace(r#"name = "orbd-test""#, r#"name = """#);
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingBridgeName)));
    }

    #[test]
    fn test_duplicate_app_id_fails() {
        let toml = format!(
            "{}\n{}",
            minimal_valid_config(),
            r#"
[[apps]]
name = "Other"
app_id = 1
org_id = 1
base_url = "http://other/"
origin = "http://other"
"#
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateAppId(1))));
    }

    #[test]
    fn test_out_of_range_app_id_fails() {
        let toml = minimal_valid_config()
            .replace("app_id = 1", "app_id = 70000")
            .replace("applications = [1]", "applications = [70000]");
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::InvalidApplication { app_id: 70000, .. }
        ));
    }

    #[test]
    fn test_unknown_channel_app_fails() {
        let toml = minimal_valid_config().replace("applications = [1]", "applications = [1, 7]");
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::UnknownChannelApp { app_id: 7, .. }
        )));
    }

    #[test]
    fn test_oversized_channel_ait_fails() {
        let mut toml = minimal_valid_config();
        let ids: Vec<String> = (1..=40).map(|i| i.to_string()).collect();
        toml = toml.replace("applications = [1]", &format!("applications = [{}]", ids.join(", ")));
        let long_url = format!("http://{}/", "a".repeat(200));
        for i in 2..=40 {
            toml.push_str(&format!(
                "\n[[apps]]\nname = \"App {i}\"\napp_id = {i}\norg_id = 1\nbase_url = \"{long_url}\"\norigin = \"http://a\"\n"
            ));
        }
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ChannelAit { .. })));
    }

    #[test]
    fn test_unknown_initial_channel_fails() {
        let toml = minimal_valid_config().replace(
            r#"name = "orbd-test""#,
            "name = \"orbd-test\"\ninitial_channel = \"ccid:none\"",
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownInitialChannel(_))));
    }
}
