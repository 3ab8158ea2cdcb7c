//! `Broadcast.*`: channel, component and presentation control.

use crate::bridge::registry::{Invocation, MethodTable, result, void};
use crate::error::{BridgeError, ParameterError};
use crate::security::SecurityLevel::{BroadcastAppOnly, BroadcastOrTransitioningAppOnly};
use crate::terminal::types::{
    ChannelTriplet, ComponentType, StreamEventTarget, TuneOptions, VideoRectangle,
};

/// `componentType` value meaning "every type".
const ANY_COMPONENT_TYPE: i32 = -1;

pub fn register(table: &mut MethodTable) {
    table.register("Broadcast.setVideoRectangle", BroadcastAppOnly, |inv| {
        let p = inv.params;
        let rect = VideoRectangle {
            x: p.required_i32("x")?,
            y: p.required_i32("y")?,
            width: p.required_i32("width")?,
            height: p.required_i32("height")?,
        };
        inv.terminal.broadcast.set_video_rectangle(rect);
        void()
    });

    table.register(
        "Broadcast.getCurrentChannel",
        BroadcastOrTransitioningAppOnly,
        |inv| result(inv.terminal.broadcast.current_channel()),
    );

    table.register("Broadcast.getChannelList", BroadcastAppOnly, |inv| {
        result(inv.terminal.broadcast.channel_list())
    });

    table.register("Broadcast.setChannelToNull", BroadcastAppOnly, |inv| {
        inv.terminal.broadcast.set_channel_to_null();
        void()
    });

    table.register("Broadcast.setChannelToCcid", BroadcastAppOnly, |inv| {
        let ccid = inv.params.required_str("ccid")?;
        let options = tune_options(inv)?;
        result(inv.terminal.broadcast.set_channel_to_ccid(ccid, &options))
    });

    table.register("Broadcast.setChannelToTriplet", BroadcastAppOnly, |inv| {
        let p = inv.params;
        let triplet = ChannelTriplet {
            id_type: p.required_i32("idType")?,
            onid: p.required_u16("onid")?,
            tsid: p.required_u16("tsid")?,
            sid: p.required_u16("sid")?,
            source_id: match p.optional_i32("sourceID", -1)? {
                -1 => None,
                id => Some(id),
            },
            ip_broadcast_id: match p.optional_str("ipBroadcastID", "")? {
                "" => None,
                id => Some(id.to_string()),
            },
        };
        let options = tune_options(inv)?;
        result(
            inv.terminal
                .broadcast
                .set_channel_to_triplet(&triplet, &options),
        )
    });

    table.register("Broadcast.setPresentationSuspended", BroadcastAppOnly, |inv| {
        let suspended = inv.params.required_bool("presentationSuspended")?;
        inv.terminal.broadcast.set_presentation_suspended(suspended);
        void()
    });

    table.register("Broadcast.getComponents", BroadcastAppOnly, |inv| {
        let ccid = inv.params.required_str("ccid")?;
        let filter = match inv.params.optional_i32("componentType", ANY_COMPONENT_TYPE)? {
            ANY_COMPONENT_TYPE => None,
            code => Some(component_type(code)?),
        };
        result(inv.terminal.broadcast.components(ccid, filter))
    });

    table.register("Broadcast.overrideComponentSelection", BroadcastAppOnly, |inv| {
        let kind = component_type(inv.params.required_i32("componentType")?)?;
        let id = inv.params.required_str("id")?;
        inv.terminal
            .broadcast
            .override_component_selection(kind, id);
        void()
    });

    table.register("Broadcast.restoreComponentSelection", BroadcastAppOnly, |inv| {
        let kind = component_type(inv.params.required_i32("componentType")?)?;
        inv.terminal.broadcast.restore_component_selection(kind);
        void()
    });

    table.register("Broadcast.addStreamEventListener", BroadcastAppOnly, |inv| {
        let p = inv.params;
        let target = StreamEventTarget {
            target_url: p.required_str("targetURL")?.to_string(),
            event_name: p.required_str("eventName")?.to_string(),
            component_tag: p.required_i32("componentTag")?,
            stream_event_id: p.required_i32("streamEventId")?,
        };
        result(inv.terminal.broadcast.add_stream_event_listener(target))
    });

    table.register("Broadcast.removeStreamEventListener", BroadcastAppOnly, |inv| {
        let id = inv.params.required_i32("id")?;
        inv.terminal.broadcast.remove_stream_event_listener(id);
        void()
    });
}

fn tune_options(inv: &Invocation<'_>) -> Result<TuneOptions, BridgeError> {
    let p = inv.params;
    Ok(TuneOptions {
        trickplay: p.optional_bool("trickplay", false)?,
        content_access_descriptor_url: p
            .optional_str("contentAccessDescriptorURL", "")?
            .to_string(),
        quiet: p.optional_i32("quiet", 0)?,
    })
}

fn component_type(code: i32) -> Result<ComponentType, BridgeError> {
    ComponentType::from_code(code.into()).ok_or_else(|| {
        ParameterError::OutOfRange {
            name: "componentType".to_string(),
            value: code.to_string(),
        }
        .into()
    })
}
