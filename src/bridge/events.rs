//! Outward event channel.
//!
//! Handlers and terminal collaborators notify the hosted application of
//! asynchronous state changes through one primitive,
//! [`EventDispatcher::dispatch`], which forwards verbatim to the single
//! registered [`EventSink`]. Delivery is fire-and-forget.
//!
//! Sinks must not call back into the dispatcher synchronously. The gateway's
//! sink only enqueues onto a broadcast channel, so events are always
//! delivered after the request that caused them has returned.

#[cfg(test)]
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::trace;

/// Named events the bridge emits.
pub mod names {
    pub const CHANNEL_STATUS_CHANGED: &str = "ChannelStatusChanged";
    pub const COMPONENT_CHANGED: &str = "ComponentChanged";
    pub const SELECTED_COMPONENT_CHANGED: &str = "SelectedComponentChanged";
    pub const PROGRAMMES_CHANGED: &str = "ProgrammesChanged";
    pub const TRANSITIONED_TO_BROADCAST_RELATED: &str = "TransitionedToBroadcastRelated";
    pub const TIMELINE_AVAILABLE: &str = "TimelineAvailable";
    pub const TIMELINE_UNAVAILABLE: &str = "TimelineUnavailable";
    pub const STREAM_EVENT: &str = "StreamEvent";
    pub const DRM_SYSTEM_STATUS_CHANGE: &str = "DRMSystemStatusChange";
    pub const DRM_MESSAGE_RESULT: &str = "DRMMessageResult";
    pub const METADATA_SEARCH: &str = "MetadataSearch";
    pub const ACCESS_TO_DISTINCTIVE_IDENTIFIER: &str = "accesstodistinctiveidentifier";
}

/// One event as delivered to the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeEvent {
    pub event: String,
    pub properties: Map<String, Value>,
}

/// Receiver of outward events.
pub trait EventSink: Send + Sync {
    fn dispatch_event(&self, event: &str, properties: Map<String, Value>);
}

/// Cheap, cloneable handle to the registered sink.
#[derive(Clone)]
pub struct EventDispatcher {
    sink: Arc<dyn EventSink>,
}

impl EventDispatcher {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Forward an event to the sink. No acknowledgement, no retry.
    pub fn dispatch(&self, event: &str, properties: Map<String, Value>) {
        trace!(event, "Dispatching event");
        crate::metrics::record_event(event);
        self.sink.dispatch_event(event, properties);
    }

    /// Forward an event whose properties are built with `serde_json::json!`.
    ///
    /// Non-object values are dispatched with empty properties.
    pub fn dispatch_json(&self, event: &str, properties: Value) {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.dispatch(event, properties);
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}

/// Sink that keeps every event in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<BridgeEvent>>,
}

#[cfg(test)]
impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<BridgeEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
impl EventSink for RecordingEventSink {
    fn dispatch_event(&self, event: &str, properties: Map<String, Value>) {
        self.events.lock().push(BridgeEvent {
            event: event.to_string(),
            properties,
        });
    }
}
