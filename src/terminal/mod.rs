//! Terminal collaborators.
//!
//! The bridge decides *whether* a call may happen; these traits decide
//! *what* it does. One trait per functional group of the method catalogue,
//! bundled in [`Collaborators`] together with the outward event handle.
//!
//! Implementations own their own thread-safety. [`mock::MockTerminal`]
//! implements every trait for the daemon and for tests.

pub mod mock;
pub mod types;

use crate::bridge::events::EventDispatcher;
use std::sync::Arc;
use types::*;

pub use mock::MockTerminal;

/// Channel, component and presentation control.
pub trait BroadcastControl: Send + Sync {
    fn set_video_rectangle(&self, rect: VideoRectangle);
    fn current_channel(&self) -> Option<Channel>;
    fn channel_list(&self) -> Vec<Channel>;
    fn set_channel_to_null(&self);
    /// Returns the resulting channel status code.
    fn set_channel_to_ccid(&self, ccid: &str, options: &TuneOptions) -> i32;
    /// Returns the resulting channel status code.
    fn set_channel_to_triplet(&self, triplet: &ChannelTriplet, options: &TuneOptions) -> i32;
    fn set_presentation_suspended(&self, suspended: bool);
    fn components(&self, ccid: &str, component_type: Option<ComponentType>) -> Vec<Component>;
    fn override_component_selection(&self, component_type: ComponentType, id: &str);
    fn restore_component_selection(&self, component_type: ComponentType);
    /// Returns the listener id.
    fn add_stream_event_listener(&self, target: StreamEventTarget) -> i32;
    fn remove_stream_event_listener(&self, id: i32);
}

/// Programme and SI metadata.
pub trait ProgrammeMetadata: Send + Sync {
    fn present_following(&self, ccid: &str) -> Vec<Programme>;
    /// Results arrive later as `MetadataSearch` events.
    fn start_search(&self, request: SearchRequest);
    fn abort_search(&self, query_id: i32);
}

/// Parental rating schemes and thresholds.
pub trait ParentalControl: Send + Sync {
    fn rating_schemes(&self) -> Vec<RatingScheme>;
    fn threshold(&self, scheme: &str) -> Option<ParentalRating>;
    fn is_rating_blocked(&self, scheme: &str, region: &str, value: i32) -> bool;
}

/// Read-only configuration queries plus distinctive-identifier consent.
pub trait TerminalConfiguration: Send + Sync {
    fn capabilities(&self) -> Capabilities;
    fn audio_profiles(&self) -> Vec<MediaProfile>;
    fn video_profiles(&self) -> Vec<MediaProfile>;
    fn local_system(&self) -> LocalSystem;
    fn preferred_audio_language(&self) -> String;
    fn preferred_subtitle_language(&self) -> String;
    fn preferred_ui_language(&self) -> String;
    fn country_id(&self) -> String;
    fn subtitles_enabled(&self) -> bool;
    fn audio_description_enabled(&self) -> bool;
    /// Empty when the user has not consented for `origin`.
    fn distinctive_identifier(&self, origin: &str) -> String;
    /// Starts the consent flow; the outcome arrives as an
    /// `accesstodistinctiveidentifier` event.
    fn request_access_to_distinctive_identifier(&self, origin: &str);
}

/// Media synchronisation sessions, keyed by numeric id.
pub trait MediaSync: Send + Sync {
    fn instantiate(&self) -> i32;
    fn initialise(&self, id: i32, is_master_broadcast: bool) -> bool;
    fn destroy(&self, id: i32);
    fn enable_inter_device_sync(&self, id: i32, ip_address: &str) -> bool;
    fn disable_inter_device_sync(&self, id: i32);
    fn nr_of_slaves(&self, id: i32) -> i32;
    fn inter_device_sync_enabled(&self, id: i32) -> bool;
    fn content_id_override(&self, id: i32) -> String;
    fn set_content_id_override(&self, id: i32, content_id: &str);
    fn start_timeline_monitoring(&self, timeline_selector: &str, is_master: bool) -> bool;
    fn stop_timeline_monitoring(&self, timeline_selector: &str, force_stop: bool);
    fn update_css_cii_properties(&self, properties: &CssCiiProperties) -> bool;
}

/// DRM system status and messaging.
pub trait DrmAgent: Send + Sync {
    fn supported_drm_systems(&self) -> Vec<DrmSystemStatus>;
    /// Returns the message id; the answer arrives as a `DRMMessageResult` event.
    fn send_drm_message(
        &self,
        msg_id: &str,
        msg_type: &str,
        msg: &str,
        drm_system_id: &str,
        block: bool,
    ) -> String;
    fn can_play_content(&self, drm_private_data: &str, drm_system_id: &str) -> bool;
    fn can_record_content(&self, protection_data: &str) -> bool;
    fn set_active_drm(&self, drm_system_id: &str) -> bool;
}

/// Application-manager services: keys, soft keyboard, name resolution.
pub trait AppManager: Send + Sync {
    /// Returns the key set actually granted.
    fn set_key_value(&self, app_id: u32, value: i32, other_keys: &[String]) -> i32;
    fn key_icon(&self, code: i32) -> String;
    fn show_software_keyboard(&self, input_type: &str) -> bool;
    fn resolve_host_address(&self, hostname: &str, ip_version: i32) -> Option<String>;
}

/// Debug-build test report publishing.
pub trait TestReporter: Send + Sync {
    fn publish_test_report(&self, test_suite: &str, xml: &str);
}

/// Everything a handler may call into.
#[derive(Clone)]
pub struct Collaborators {
    pub broadcast: Arc<dyn BroadcastControl>,
    pub programmes: Arc<dyn ProgrammeMetadata>,
    pub parental: Arc<dyn ParentalControl>,
    pub configuration: Arc<dyn TerminalConfiguration>,
    pub media_sync: Arc<dyn MediaSync>,
    pub drm: Arc<dyn DrmAgent>,
    pub manager: Arc<dyn AppManager>,
    pub reporter: Arc<dyn TestReporter>,
    pub events: EventDispatcher,
}

impl Collaborators {
    /// Use one terminal implementation for every group.
    pub fn from_terminal<T>(terminal: Arc<T>, events: EventDispatcher) -> Self
    where
        T: BroadcastControl
            + ProgrammeMetadata
            + ParentalControl
            + TerminalConfiguration
            + MediaSync
            + DrmAgent
            + AppManager
            + TestReporter
            + 'static,
    {
        Self {
            broadcast: terminal.clone(),
            programmes: terminal.clone(),
            parental: terminal.clone(),
            configuration: terminal.clone(),
            media_sync: terminal.clone(),
            drm: terminal.clone(),
            manager: terminal.clone(),
            reporter: terminal,
            events,
        }
    }
}
