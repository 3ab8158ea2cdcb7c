//! Values exchanged between bridge handlers and terminal collaborators.
//!
//! Everything serializes in the camelCase shape the hosted application's
//! script layer expects.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A broadcast service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub ccid: String,
    pub name: String,
    /// 0 = TV, 1 = radio.
    pub channel_type: i32,
    /// Delivery system identifier type (e.g. 12 = DVB-T).
    pub id_type: i32,
    pub onid: u16,
    pub tsid: u16,
    pub sid: u16,
    pub major_channel: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_broadcast_id: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

/// DVB triplet addressing of a service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTriplet {
    pub id_type: i32,
    pub onid: u16,
    pub tsid: u16,
    pub sid: u16,
    #[serde(default)]
    pub source_id: Option<i32>,
    #[serde(default)]
    pub ip_broadcast_id: Option<String>,
}

/// Options common to every channel change request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TuneOptions {
    pub trickplay: bool,
    pub content_access_descriptor_url: String,
    /// 0 = normal, 1 = quiet, 2 = quiet without notifying the app.
    pub quiet: i32,
}

/// Video plane position, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Kind of an elementary stream component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Video = 0,
    Audio = 1,
    Subtitle = 2,
}

impl ComponentType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Video),
            1 => Some(Self::Audio),
            2 => Some(Self::Subtitle),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Serialize for ComponentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// One component of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub component_tag: u8,
    pub pid: u16,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub encoding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub audio_description: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<u8>,
    pub hidden: bool,
    pub active: bool,
}

impl Component {
    /// Identifier used by `overrideComponentSelection`.
    pub fn id(&self) -> String {
        self.component_tag.to_string()
    }
}

/// A parental rating value under some scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentalRating {
    pub name: String,
    pub scheme: String,
    pub value: i32,
    pub labels: i32,
    pub region: String,
}

/// A rating scheme and the ratings it defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingScheme {
    pub name: String,
    pub ratings: Vec<ParentalRating>,
}

/// A schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Programme {
    pub programme_id: String,
    pub name: String,
    pub description: String,
    /// Seconds since the Unix epoch.
    pub start_time: i64,
    /// Seconds.
    pub duration: i64,
    pub channel_id: String,
    pub parental_ratings: Vec<ParentalRating>,
}

/// A metadata search started by `Programme.startSearch`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query_id: i32,
    pub query: Value,
    pub offset: i32,
    pub count: i32,
    pub channel_constraints: Vec<String>,
}

/// A DSM-CC stream event subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEventTarget {
    pub target_url: String,
    pub event_name: String,
    pub component_tag: i32,
    pub stream_event_id: i32,
}

/// Terminal option strings and display properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub option_strings: Vec<String>,
    pub profile_name_fragments: Vec<String>,
    pub parental_schemes: Vec<String>,
    pub graphics_levels: Vec<String>,
    pub broadcast_urns: Vec<String>,
    pub display_size_width: u32,
    pub display_size_height: u32,
    pub display_size_measurement_type: String,
}

/// An audio or video media profile the terminal can play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub transport: String,
    pub sync_tl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drm_system_id: Option<String>,
}

/// Identification of the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSystem {
    pub vendor_name: String,
    pub model_name: String,
    pub family_name: String,
    pub software_version: String,
    pub hardware_version: String,
}

/// Status of one DRM system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrmSystemStatus {
    #[serde(rename = "DRMSystem")]
    pub drm_system: String,
    #[serde(rename = "DRMSystemIDs")]
    pub drm_system_ids: Vec<String>,
    /// 0 = ready, 1 = unknown, 2 = initialising, 3 = error.
    pub status: i32,
    pub protection_gateways: String,
    pub supported_formats: String,
}

/// CSS-CII properties pushed by `MediaSynchroniser.updateCssCiiProperties`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssCiiProperties {
    pub content_id: String,
    pub presentation_status: String,
    pub content_id_status: String,
    pub mrs_url: String,
}
