//! Default value functions for configuration.

use std::net::SocketAddr;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Bridge Defaults
// =============================================================================

pub fn default_bridge_name() -> String {
    "orbd".to_string()
}

pub fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8910))
}

/// Debug methods follow the build profile unless configured.
pub fn default_test_reports() -> bool {
    cfg!(debug_assertions)
}

pub fn default_ait_pid() -> u16 {
    0x1F5
}

pub fn default_event_buffer() -> usize {
    256
}

// =============================================================================
// Channel Defaults
// =============================================================================

/// DVB-T.
pub fn default_id_type() -> i32 {
    12
}

// =============================================================================
// Terminal Defaults
// =============================================================================

pub fn default_language() -> String {
    "eng".to_string()
}

pub fn default_country_id() -> String {
    "GBR".to_string()
}

pub fn default_device_id() -> String {
    "orbd-mock-device".to_string()
}

pub fn default_display_width() -> u32 {
    1920
}

pub fn default_display_height() -> u32 {
    1080
}

pub fn default_parental_scheme() -> String {
    "dvb-si".to_string()
}

pub fn default_parental_threshold() -> i32 {
    18
}
