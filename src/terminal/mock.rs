//! Deterministic in-memory terminal.
//!
//! Implements every collaborator trait from configuration alone. Side
//! effects are reported through the shared [`EventDispatcher`]. Every trait
//! call is traced; tests can also enable a call log to assert which
//! collaborator methods ran.

use super::types::*;
use super::*;
use crate::bridge::events::names;
use crate::config::{ChannelConfig, Config, TerminalConfig};
use crate::security::ContextPolicy;
use crate::signalling::AitScenario;
use dashmap::{DashMap, DashSet};
use orb_ait::Application;
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use tracing::{debug, info, trace, warn};

/// Channel status codes carried in `ChannelStatusChanged`.
pub mod status {
    pub const UNREALIZED: i32 = -4;
    pub const PRESENTING: i32 = -3;
    pub const UNKNOWN_CHANNEL: i32 = 5;
}

/// `DRMMessageResult` result codes.
mod drm_result {
    pub const SUCCESSFUL: i32 = 0;
    pub const UNKNOWN_DRM_SYSTEM: i32 = 5;
}

/// `MetadataSearch` status codes.
mod search_status {
    pub const COMPLETED: i32 = 0;
    pub const ABORTED: i32 = 3;
}

/// Keys an application may request through `setKeyValue`.
pub const KEY_SET_MASK: i32 = 0x7FF;

/// Programme slots are this many seconds long.
const SLOT_SECS: i64 = 1800;

const TIMELINE_URN_PREFIX: &str = "urn:dvb:css:timeline:";

#[derive(Debug, Default, Clone)]
struct SyncSession {
    initialised: bool,
    master_broadcast: bool,
    inter_device: Option<String>,
    content_id_override: String,
}

pub struct MockTerminal {
    settings: TerminalConfig,
    channels: Vec<ChannelConfig>,
    channel_apps: HashMap<String, Vec<Application>>,
    events: EventDispatcher,
    ait: Option<Arc<AitScenario>>,
    policy: Option<Arc<ContextPolicy>>,
    /// Only kept when enabled with `with_call_log`.
    calls: Option<Mutex<Vec<String>>>,

    current: RwLock<Option<Channel>>,
    video_rectangle: Mutex<VideoRectangle>,
    suspended: AtomicBool,
    component_overrides: DashMap<ComponentType, String>,
    stream_listeners: DashMap<i32, StreamEventTarget>,
    next_listener: AtomicI32,

    sync_sessions: DashMap<i32, SyncSession>,
    next_sync: AtomicI32,
    timelines: DashSet<String>,
    css_cii: Mutex<Option<CssCiiProperties>>,

    active_drm: RwLock<Option<String>>,
    key_sets: DashMap<u32, i32>,
    consent: DashMap<String, bool>,
}

impl MockTerminal {
    pub fn new(config: &Config, events: EventDispatcher) -> Self {
        let channel_apps = config
            .channels
            .iter()
            .map(|c| (c.ccid.clone(), config.channel_applications(c)))
            .collect();
        let settings = config.terminal.clone();
        let rect = VideoRectangle {
            x: 0,
            y: 0,
            width: settings.display_width as i32,
            height: settings.display_height as i32,
        };
        Self {
            settings,
            channels: config.channels.clone(),
            channel_apps,
            events,
            ait: None,
            policy: None,
            calls: None,
            current: RwLock::new(None),
            video_rectangle: Mutex::new(rect),
            suspended: AtomicBool::new(false),
            component_overrides: DashMap::new(),
            stream_listeners: DashMap::new(),
            next_listener: AtomicI32::new(1),
            sync_sessions: DashMap::new(),
            next_sync: AtomicI32::new(1),
            timelines: DashSet::new(),
            css_cii: Mutex::new(None),
            active_drm: RwLock::new(None),
            key_sets: DashMap::new(),
            consent: DashMap::new(),
        }
    }

    /// Republish the AIT through `scenario` on every successful tune.
    pub fn with_signalling(mut self, scenario: Arc<AitScenario>) -> Self {
        self.ait = Some(scenario);
        self
    }

    /// Keep the running application's broadcast relation in step with tuning.
    pub fn with_policy(mut self, policy: Arc<ContextPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    fn record(&self, call: impl Into<String>) {
        let call = call.into();
        trace!(%call, "Terminal call");
        if let Some(calls) = &self.calls {
            calls.lock().push(call);
        }
    }

    fn find_ccid(&self, ccid: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.ccid == ccid)
    }

    fn tune(&self, target: Option<&ChannelConfig>, options: &TuneOptions) -> i32 {
        let Some(channel) = target else {
            debug!("Tune to unknown channel");
            self.channel_status(None, status::UNKNOWN_CHANNEL, options);
            return status::UNKNOWN_CHANNEL;
        };

        let tuned = channel.to_channel();
        info!(ccid = %tuned.ccid, sid = tuned.sid, "Tuned");
        *self.current.write() = Some(tuned.clone());
        self.component_overrides.clear();
        self.channel_status(Some(&tuned), status::PRESENTING, options);
        if options.quiet != 2 {
            self.events
                .dispatch_json(names::COMPONENT_CHANGED, json!({ "componentType": null }));
            self.events.dispatch_json(names::PROGRAMMES_CHANGED, json!({}));
        }

        let apps = self
            .channel_apps
            .get(&channel.ccid)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if let Some(policy) = &self.policy
            && let Some(running) = policy.running()
            && apps.iter().any(|a| a.id == running)
        {
            policy.set_broadcast_related(true);
        }
        if let Some(ait) = &self.ait
            && let Err(e) = ait.publish(tuned.sid, apps)
        {
            warn!(ccid = %tuned.ccid, error = %e, "AIT not republished");
        }
        status::PRESENTING
    }

    fn channel_status(&self, channel: Option<&Channel>, code: i32, options: &TuneOptions) {
        if options.quiet == 2 {
            return;
        }
        let (onid, tsid, sid) = channel.map(|c| (c.onid, c.tsid, c.sid)).unwrap_or_default();
        self.events.dispatch_json(
            names::CHANNEL_STATUS_CHANGED,
            json!({
                "onetId": onid,
                "transId": tsid,
                "servId": sid,
                "statusCode": code,
                "permanentError": code == status::UNKNOWN_CHANNEL,
            }),
        );
    }

    fn slot_start(now: i64) -> i64 {
        now - now.rem_euclid(SLOT_SECS)
    }

    fn schedule(&self, channel: &ChannelConfig, now: i64) -> Vec<Programme> {
        let start = Self::slot_start(now);
        let rating = |value: i32| ParentalRating {
            name: value.to_string(),
            scheme: self.settings.parental_scheme.clone(),
            value,
            labels: 0,
            region: self.settings.country_id.to_lowercase(),
        };
        [("Now on", start, 12), ("Next on", start + SLOT_SECS, 4)]
            .into_iter()
            .map(|(prefix, start_time, age)| Programme {
                programme_id: format!("{};{:x}", channel.ccid, start_time),
                name: format!("{prefix} {}", channel.name),
                description: String::new(),
                start_time,
                duration: SLOT_SECS,
                channel_id: channel.ccid.clone(),
                parental_ratings: vec![rating(age)],
            })
            .collect()
    }

    fn channel_components(&self, channel: &ChannelConfig) -> Vec<Component> {
        let base = channel.sid.wrapping_mul(0x10);
        let lang = &self.settings.audio_language;
        let mut components = vec![
            component(1, base, ComponentType::Video, "H.264", None),
            component(2, base + 1, ComponentType::Audio, "E-AC3", Some("eng")),
            component(3, base + 2, ComponentType::Audio, "HEAAC", Some("deu")),
            component(4, base + 3, ComponentType::Subtitle, "DVB-SUBT", Some("eng")),
        ];
        components[2].audio_description = true;

        for c in &mut components {
            let overridden = self.component_overrides.get(&c.component_type);
            c.active = match (overridden, c.component_type) {
                (Some(id), _) => *id == c.id(),
                (None, ComponentType::Video) => true,
                (None, ComponentType::Audio) => {
                    c.language.as_deref() == Some(lang.as_str())
                        && c.audio_description == self.settings.audio_description_enabled
                }
                (None, ComponentType::Subtitle) => self.settings.subtitles_enabled,
            };
        }
        components
    }

    fn drm_known(&self, drm_system_id: &str) -> bool {
        self.settings
            .drm_systems
            .iter()
            .any(|d| d.system_id == drm_system_id)
    }
}

#[cfg(test)]
impl MockTerminal {
    /// Keep a log of every collaborator call.
    pub fn with_call_log(mut self) -> Self {
        self.calls = Some(Mutex::new(Vec::new()));
        self
    }

    /// Every collaborator call so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.as_ref().map(|c| c.lock().clone()).unwrap_or_default()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<String> {
        self.calls
            .as_ref()
            .map(|c| std::mem::take(&mut *c.lock()))
            .unwrap_or_default()
    }

    /// Tuned channel, without touching the call log.
    pub fn current_channel_ccid(&self) -> Option<String> {
        self.current.read().as_ref().map(|c| c.ccid.clone())
    }

    pub fn is_presentation_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    pub fn video_rectangle(&self) -> VideoRectangle {
        *self.video_rectangle.lock()
    }

    /// Key set granted to `app_id`, 0 if none.
    pub fn key_set(&self, app_id: u32) -> i32 {
        self.key_sets.get(&app_id).map(|v| *v).unwrap_or(0)
    }

    pub fn active_drm(&self) -> Option<String> {
        self.active_drm.read().clone()
    }

    /// Registered stream event listener ids, ascending.
    pub fn stream_listener_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.stream_listeners.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn css_cii_properties(&self) -> Option<CssCiiProperties> {
        self.css_cii.lock().clone()
    }
}

fn component(
    tag: u8,
    pid: u16,
    component_type: ComponentType,
    encoding: &str,
    language: Option<&str>,
) -> Component {
    Component {
        component_tag: tag,
        pid,
        component_type,
        encoding: encoding.to_string(),
        language: language.map(str::to_string),
        audio_description: false,
        audio_channels: (component_type == ComponentType::Audio).then_some(2),
        hidden: false,
        active: false,
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

impl std::fmt::Debug for MockTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTerminal")
            .field("channels", &self.channels.len())
            .field("current", &self.current.read().as_ref().map(|c| c.ccid.clone()))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Broadcast
// ============================================================================

impl BroadcastControl for MockTerminal {
    fn set_video_rectangle(&self, rect: VideoRectangle) {
        self.record("set_video_rectangle");
        let previous = std::mem::replace(&mut *self.video_rectangle.lock(), rect);
        debug!(?previous, ?rect, "Video rectangle set");
    }

    fn current_channel(&self) -> Option<Channel> {
        self.record("current_channel");
        self.current.read().clone()
    }

    fn channel_list(&self) -> Vec<Channel> {
        self.record("channel_list");
        self.channels.iter().map(ChannelConfig::to_channel).collect()
    }

    fn set_channel_to_null(&self) {
        self.record("set_channel_to_null");
        let previous = self.current.write().take();
        if let Some(previous) = previous {
            info!(ccid = %previous.ccid, "Broadcast presentation stopped");
            self.channel_status(Some(&previous), status::UNREALIZED, &TuneOptions::default());
        }
        if let Some(policy) = &self.policy {
            policy.set_broadcast_related(false);
        }
    }

    fn set_channel_to_ccid(&self, ccid: &str, options: &TuneOptions) -> i32 {
        self.record(format!("set_channel_to_ccid {ccid}"));
        self.tune(self.find_ccid(ccid), options)
    }

    fn set_channel_to_triplet(&self, triplet: &ChannelTriplet, options: &TuneOptions) -> i32 {
        self.record(format!(
            "set_channel_to_triplet {}.{}.{}",
            triplet.onid, triplet.tsid, triplet.sid
        ));
        let target = self.channels.iter().find(|c| {
            c.onid == triplet.onid && c.tsid == triplet.tsid && c.sid == triplet.sid
        });
        self.tune(target, options)
    }

    fn set_presentation_suspended(&self, suspended: bool) {
        self.record("set_presentation_suspended");
        self.suspended.store(suspended, Ordering::Relaxed);
    }

    fn components(&self, ccid: &str, component_type: Option<ComponentType>) -> Vec<Component> {
        self.record(format!("components {ccid}"));
        let Some(channel) = self.find_ccid(ccid) else {
            return Vec::new();
        };
        self.channel_components(channel)
            .into_iter()
            .filter(|c| component_type.is_none_or(|t| c.component_type == t))
            .collect()
    }

    fn override_component_selection(&self, component_type: ComponentType, id: &str) {
        self.record("override_component_selection");
        self.component_overrides
            .insert(component_type, id.to_string());
        self.events.dispatch_json(
            names::SELECTED_COMPONENT_CHANGED,
            json!({ "componentType": component_type.code() }),
        );
    }

    fn restore_component_selection(&self, component_type: ComponentType) {
        self.record("restore_component_selection");
        if self.component_overrides.remove(&component_type).is_some() {
            self.events.dispatch_json(
                names::SELECTED_COMPONENT_CHANGED,
                json!({ "componentType": component_type.code() }),
            );
        }
    }

    fn add_stream_event_listener(&self, target: StreamEventTarget) -> i32 {
        self.record("add_stream_event_listener");
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        if self.current.read().is_none() {
            debug!(id, event = %target.event_name, "No broadcast presenting; stream event listener failed");
            self.events.dispatch_json(
                names::STREAM_EVENT,
                json!({
                    "id": id,
                    "name": target.event_name,
                    "data": "",
                    "text": "",
                    "status": "error",
                }),
            );
            return id;
        }
        debug!(id, event = %target.event_name, "Stream event listener added");
        self.stream_listeners.insert(id, target);
        id
    }

    fn remove_stream_event_listener(&self, id: i32) {
        self.record("remove_stream_event_listener");
        self.stream_listeners.remove(&id);
    }
}

// ============================================================================
// Programmes
// ============================================================================

impl ProgrammeMetadata for MockTerminal {
    fn present_following(&self, ccid: &str) -> Vec<Programme> {
        self.record(format!("present_following {ccid}"));
        let now = chrono::Utc::now().timestamp();
        self.find_ccid(ccid)
            .map(|c| self.schedule(c, now))
            .unwrap_or_default()
    }

    fn start_search(&self, request: SearchRequest) {
        self.record("start_search");
        let now = chrono::Utc::now().timestamp();
        let needle = request
            .query
            .get("value")
            .and_then(|v| v.as_str())
            .map(str::to_lowercase);

        let matches: Vec<Programme> = self
            .channels
            .iter()
            .filter(|c| {
                request.channel_constraints.is_empty()
                    || request.channel_constraints.contains(&c.ccid)
            })
            .flat_map(|c| self.schedule(c, now))
            .filter(|p| {
                needle
                    .as_ref()
                    .is_none_or(|n| p.name.to_lowercase().contains(n))
            })
            .collect();

        let total = matches.len();
        let page: Vec<Programme> = matches
            .into_iter()
            .skip(request.offset.max(0) as usize)
            .take(request.count.max(0) as usize)
            .collect();

        self.events.dispatch_json(
            names::METADATA_SEARCH,
            json!({
                "search": { "id": request.query_id },
                "status": search_status::COMPLETED,
                "programmeList": page,
                "offset": request.offset,
                "totalSize": total,
            }),
        );
    }

    fn abort_search(&self, query_id: i32) {
        self.record("abort_search");
        self.events.dispatch_json(
            names::METADATA_SEARCH,
            json!({ "search": { "id": query_id }, "status": search_status::ABORTED }),
        );
    }
}

// ============================================================================
// Parental control
// ============================================================================

impl ParentalControl for MockTerminal {
    fn rating_schemes(&self) -> Vec<RatingScheme> {
        self.record("rating_schemes");
        let scheme = &self.settings.parental_scheme;
        let region = self.settings.country_id.to_lowercase();
        vec![RatingScheme {
            name: scheme.clone(),
            ratings: (4..=18)
                .map(|value| ParentalRating {
                    name: value.to_string(),
                    scheme: scheme.clone(),
                    value,
                    labels: 0,
                    region: region.clone(),
                })
                .collect(),
        }]
    }

    fn threshold(&self, scheme: &str) -> Option<ParentalRating> {
        self.record("threshold");
        (scheme == self.settings.parental_scheme).then(|| ParentalRating {
            name: self.settings.parental_threshold.to_string(),
            scheme: scheme.to_string(),
            value: self.settings.parental_threshold,
            labels: 0,
            region: self.settings.country_id.to_lowercase(),
        })
    }

    fn is_rating_blocked(&self, scheme: &str, _region: &str, value: i32) -> bool {
        self.record("is_rating_blocked");
        scheme == self.settings.parental_scheme && value >= self.settings.parental_threshold
    }
}

// ============================================================================
// Configuration
// ============================================================================

impl TerminalConfiguration for MockTerminal {
    fn capabilities(&self) -> Capabilities {
        self.record("capabilities");
        Capabilities {
            option_strings: vec!["+DVB_T".into(), "+DRM".into()],
            profile_name_fragments: vec!["+TRICKMODE".into(), "+DL".into()],
            parental_schemes: vec![self.settings.parental_scheme.clone()],
            graphics_levels: vec!["urn:hbbtv:graphics:performance:level1".into()],
            broadcast_urns: vec!["urn:dvb:broadcast:ird:video:25_Hz_H.264_AVC_HDTV_IRD".into()],
            display_size_width: self.settings.display_width,
            display_size_height: self.settings.display_height,
            display_size_measurement_type: "pixels".into(),
        }
    }

    fn audio_profiles(&self) -> Vec<MediaProfile> {
        self.record("audio_profiles");
        ["MPEG1_L3", "HEAAC", "E-AC3"]
            .into_iter()
            .map(|name| MediaProfile {
                name: name.into(),
                kind: "audio/mp4".into(),
                transport: "dash".into(),
                sync_tl: "dash_pr".into(),
                drm_system_id: None,
            })
            .collect()
    }

    fn video_profiles(&self) -> Vec<MediaProfile> {
        self.record("video_profiles");
        let drm = self.settings.drm_systems.first().map(|d| d.system_id.clone());
        vec![
            MediaProfile {
                name: "MP4_AVC_HD_25_HEAAC_EBUTTD".into(),
                kind: "video/mp4".into(),
                transport: "dash".into(),
                sync_tl: "dash_pr".into(),
                drm_system_id: drm,
            },
            MediaProfile {
                name: "TS_AVC_HD_25_HEAAC".into(),
                kind: "video/mpeg".into(),
                transport: "dvb".into(),
                sync_tl: "temi".into(),
                drm_system_id: None,
            },
        ]
    }

    fn local_system(&self) -> LocalSystem {
        self.record("local_system");
        self.settings.local_system.clone()
    }

    fn preferred_audio_language(&self) -> String {
        self.record("preferred_audio_language");
        self.settings.audio_language.clone()
    }

    fn preferred_subtitle_language(&self) -> String {
        self.record("preferred_subtitle_language");
        self.settings.subtitle_language.clone()
    }

    fn preferred_ui_language(&self) -> String {
        self.record("preferred_ui_language");
        self.settings.ui_language.clone()
    }

    fn country_id(&self) -> String {
        self.record("country_id");
        self.settings.country_id.clone()
    }

    fn subtitles_enabled(&self) -> bool {
        self.record("subtitles_enabled");
        self.settings.subtitles_enabled
    }

    fn audio_description_enabled(&self) -> bool {
        self.record("audio_description_enabled");
        self.settings.audio_description_enabled
    }

    fn distinctive_identifier(&self, origin: &str) -> String {
        self.record("distinctive_identifier");
        if !self.consent.get(origin).is_some_and(|granted| *granted) {
            return String::new();
        }
        let mut hasher = Sha256::new();
        hasher.update(self.settings.device_id.as_bytes());
        hasher.update(origin.as_bytes());
        hex(&hasher.finalize())
    }

    fn request_access_to_distinctive_identifier(&self, origin: &str) {
        self.record("request_access_to_distinctive_identifier");
        let granted = self.settings.grant_distinctive_identifier;
        self.consent.insert(origin.to_string(), granted);
        info!(origin, granted, "Distinctive identifier consent");
        self.events.dispatch_json(
            names::ACCESS_TO_DISTINCTIVE_IDENTIFIER,
            json!({ "origin": origin, "allowAccess": granted }),
        );
    }
}

// ============================================================================
// Media synchronisation
// ============================================================================

impl MediaSync for MockTerminal {
    fn instantiate(&self) -> i32 {
        self.record("instantiate");
        let id = self.next_sync.fetch_add(1, Ordering::Relaxed);
        self.sync_sessions.insert(id, SyncSession::default());
        id
    }

    fn initialise(&self, id: i32, is_master_broadcast: bool) -> bool {
        self.record("initialise");
        match self.sync_sessions.get_mut(&id) {
            Some(mut session) => {
                session.initialised = true;
                session.master_broadcast = is_master_broadcast;
                true
            }
            None => false,
        }
    }

    fn destroy(&self, id: i32) {
        self.record("destroy");
        self.sync_sessions.remove(&id);
    }

    fn enable_inter_device_sync(&self, id: i32, ip_address: &str) -> bool {
        self.record("enable_inter_device_sync");
        match self.sync_sessions.get_mut(&id) {
            Some(mut session) if session.initialised => {
                debug!(id, master = session.master_broadcast, ip_address, "Inter-device sync enabled");
                session.inter_device = Some(ip_address.to_string());
                true
            }
            _ => false,
        }
    }

    fn disable_inter_device_sync(&self, id: i32) {
        self.record("disable_inter_device_sync");
        if let Some(mut session) = self.sync_sessions.get_mut(&id) {
            session.inter_device = None;
        }
    }

    fn nr_of_slaves(&self, id: i32) -> i32 {
        self.record("nr_of_slaves");
        // No companion screens ever attach to the mock.
        match self.sync_sessions.get(&id) {
            Some(_) => 0,
            None => -1,
        }
    }

    fn inter_device_sync_enabled(&self, id: i32) -> bool {
        self.record("inter_device_sync_enabled");
        self.sync_sessions
            .get(&id)
            .is_some_and(|s| s.inter_device.is_some())
    }

    fn content_id_override(&self, id: i32) -> String {
        self.record("content_id_override");
        self.sync_sessions
            .get(&id)
            .map(|s| s.content_id_override.clone())
            .unwrap_or_default()
    }

    fn set_content_id_override(&self, id: i32, content_id: &str) {
        self.record("set_content_id_override");
        if let Some(mut session) = self.sync_sessions.get_mut(&id) {
            session.content_id_override = content_id.to_string();
        }
    }

    fn start_timeline_monitoring(&self, timeline_selector: &str, is_master: bool) -> bool {
        self.record("start_timeline_monitoring");
        if !timeline_selector.starts_with(TIMELINE_URN_PREFIX) {
            self.events.dispatch_json(
                names::TIMELINE_UNAVAILABLE,
                json!({ "timelineSelector": timeline_selector }),
            );
            return false;
        }
        self.timelines.insert(timeline_selector.to_string());
        self.events.dispatch_json(
            names::TIMELINE_AVAILABLE,
            json!({
                "timelineSelector": timeline_selector,
                "isMaster": is_master,
                "unitsPerTick": 1,
                "unitsPerSecond": 1000,
                "currentTime": 0,
            }),
        );
        true
    }

    fn stop_timeline_monitoring(&self, timeline_selector: &str, force_stop: bool) {
        self.record("stop_timeline_monitoring");
        if self.timelines.remove(timeline_selector).is_some() {
            debug!(timeline_selector, force_stop, "Timeline monitoring stopped");
            self.events.dispatch_json(
                names::TIMELINE_UNAVAILABLE,
                json!({ "timelineSelector": timeline_selector }),
            );
        }
    }

    fn update_css_cii_properties(&self, properties: &CssCiiProperties) -> bool {
        self.record("update_css_cii_properties");
        *self.css_cii.lock() = Some(properties.clone());
        true
    }
}

// ============================================================================
// DRM
// ============================================================================

impl DrmAgent for MockTerminal {
    fn supported_drm_systems(&self) -> Vec<DrmSystemStatus> {
        self.record("supported_drm_systems");
        self.settings
            .drm_systems
            .iter()
            .map(|d| DrmSystemStatus {
                drm_system: d.system_id.clone(),
                drm_system_ids: vec![d.system_id.clone()],
                status: 0,
                protection_gateways: d.protection_gateways.clone(),
                supported_formats: d.supported_formats.clone(),
            })
            .collect()
    }

    fn send_drm_message(
        &self,
        msg_id: &str,
        msg_type: &str,
        _msg: &str,
        drm_system_id: &str,
        block: bool,
    ) -> String {
        self.record("send_drm_message");
        let code = if self.drm_known(drm_system_id) {
            drm_result::SUCCESSFUL
        } else {
            drm_result::UNKNOWN_DRM_SYSTEM
        };
        debug!(msg_id, msg_type, drm_system_id, block, code, "DRM message");
        self.events.dispatch_json(
            names::DRM_MESSAGE_RESULT,
            json!({ "msgID": msg_id, "resultMsg": "", "resultCode": code }),
        );
        msg_id.to_string()
    }

    fn can_play_content(&self, _drm_private_data: &str, drm_system_id: &str) -> bool {
        self.record("can_play_content");
        self.drm_known(drm_system_id)
    }

    fn can_record_content(&self, _protection_data: &str) -> bool {
        self.record("can_record_content");
        false
    }

    fn set_active_drm(&self, drm_system_id: &str) -> bool {
        self.record("set_active_drm");
        if !self.drm_known(drm_system_id) {
            return false;
        }
        *self.active_drm.write() = Some(drm_system_id.to_string());
        self.events.dispatch_json(
            names::DRM_SYSTEM_STATUS_CHANGE,
            json!({ "DRMSystemID": drm_system_id }),
        );
        true
    }
}

// ============================================================================
// Application manager
// ============================================================================

impl AppManager for MockTerminal {
    fn set_key_value(&self, app_id: u32, value: i32, other_keys: &[String]) -> i32 {
        self.record(format!("set_key_value {value:#x} other_keys={}", other_keys.len()));
        let granted = value & KEY_SET_MASK;
        self.key_sets.insert(app_id, granted);
        granted
    }

    fn key_icon(&self, code: i32) -> String {
        self.record("key_icon");
        match code {
            403..=406 => format!("file:///usr/share/orbd/icons/key_{code}.png"),
            _ => String::new(),
        }
    }

    fn show_software_keyboard(&self, input_type: &str) -> bool {
        self.record(format!("show_software_keyboard {input_type}"));
        true
    }

    fn resolve_host_address(&self, hostname: &str, ip_version: i32) -> Option<String> {
        self.record("resolve_host_address");
        let address = self.settings.hosts.get(hostname)?;
        let is_v6 = address.contains(':');
        match ip_version {
            4 if is_v6 => None,
            6 if !is_v6 => None,
            _ => Some(address.clone()),
        }
    }
}

impl TestReporter for MockTerminal {
    fn publish_test_report(&self, test_suite: &str, xml: &str) {
        self.record("publish_test_report");
        info!(test_suite, bytes = xml.len(), "Test report published");
    }
}
