//! `MediaSynchroniser.*`: sessions are addressed by the numeric id
//! returned from `instantiate`.

use crate::bridge::registry::{MethodTable, result, void};
use crate::security::SecurityLevel::AnyApp;
use crate::terminal::types::CssCiiProperties;

pub fn register(table: &mut MethodTable) {
    table.register("MediaSynchroniser.instantiate", AnyApp, |inv| {
        result(inv.terminal.media_sync.instantiate())
    });

    table.register("MediaSynchroniser.initialise", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        let master = inv.params.required_bool("isMasterBroadcast")?;
        result(inv.terminal.media_sync.initialise(id, master))
    });

    table.register("MediaSynchroniser.destroy", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        inv.terminal.media_sync.destroy(id);
        void()
    });

    table.register("MediaSynchroniser.enableInterDeviceSync", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        let ip = inv.params.required_str("ipAddr")?;
        result(inv.terminal.media_sync.enable_inter_device_sync(id, ip))
    });

    table.register("MediaSynchroniser.disableInterDeviceSync", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        inv.terminal.media_sync.disable_inter_device_sync(id);
        void()
    });

    table.register("MediaSynchroniser.nrOfSlaves", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        result(inv.terminal.media_sync.nr_of_slaves(id))
    });

    table.register("MediaSynchroniser.interDeviceSyncEnabled", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        result(inv.terminal.media_sync.inter_device_sync_enabled(id))
    });

    table.register("MediaSynchroniser.getContentIdOverride", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        result(inv.terminal.media_sync.content_id_override(id))
    });

    table.register("MediaSynchroniser.setContentIdOverride", AnyApp, |inv| {
        let id = inv.params.required_i32("id")?;
        let content_id = inv.params.required_str("contentIdOverride")?;
        inv.terminal.media_sync.set_content_id_override(id, content_id);
        void()
    });

    table.register("MediaSynchroniser.startTimelineMonitoring", AnyApp, |inv| {
        let selector = inv.params.required_str("timelineSelector")?;
        let is_master = inv.params.optional_bool("isMaster", false)?;
        result(
            inv.terminal
                .media_sync
                .start_timeline_monitoring(selector, is_master),
        )
    });

    table.register("MediaSynchroniser.stopTimelineMonitoring", AnyApp, |inv| {
        let selector = inv.params.required_str("timelineSelector")?;
        let force = inv.params.optional_bool("forceStop", false)?;
        inv.terminal
            .media_sync
            .stop_timeline_monitoring(selector, force);
        void()
    });

    table.register("MediaSynchroniser.updateCssCiiProperties", AnyApp, |inv| {
        let p = inv.params;
        let properties = CssCiiProperties {
            content_id: p.required_str("contentId")?.to_string(),
            presentation_status: p.required_str("presentationStatus")?.to_string(),
            content_id_status: p.required_str("contentIdStatus")?.to_string(),
            mrs_url: p.optional_str("mrsUrl", "")?.to_string(),
        };
        result(
            inv.terminal
                .media_sync
                .update_css_cii_properties(&properties),
        )
    });
}
