//! `Drm.*`

use crate::bridge::registry::{MethodTable, result};
use crate::security::SecurityLevel::{AnyApp, RunningAppOnly};

pub fn register(table: &mut MethodTable) {
    table.register("Drm.getSupportedDRMSystemIDs", AnyApp, |inv| {
        result(inv.terminal.drm.supported_drm_systems())
    });

    // Answered asynchronously with DRMMessageResult.
    table.register("Drm.sendDRMMessage", AnyApp, |inv| {
        let p = inv.params;
        let msg_id = p.required_str("msgID")?;
        let msg_type = p.required_str("msgType")?;
        let msg = p.required_str("msg")?;
        let system = p.required_str("DRMSystemID")?;
        let block = p.optional_bool("block", false)?;
        result(
            inv.terminal
                .drm
                .send_drm_message(msg_id, msg_type, msg, system, block),
        )
    });

    table.register("Drm.canPlayContent", AnyApp, |inv| {
        let data = inv.params.required_str("DRMPrivateData")?;
        let system = inv.params.required_str("DRMSystemID")?;
        result(inv.terminal.drm.can_play_content(data, system))
    });

    table.register("Drm.canRecordContent", AnyApp, |inv| {
        let data = inv.params.required_str("protectionData")?;
        result(inv.terminal.drm.can_record_content(data))
    });

    table.register("Drm.setActiveDRM", RunningAppOnly, |inv| {
        let system = inv.params.required_str("DRMSystemID")?;
        result(inv.terminal.drm.set_active_drm(system))
    });
}

#[cfg(test)]
mod tests {
    use crate::bridge::events::names;
    use crate::bridge::testing::Harness;
    use serde_json::json;

    const SYSTEM: &str = "urn:dvb:casystemid:19188";

    #[test]
    fn test_supported_systems_wire_shape() {
        let h = Harness::new();
        let token = h.token(2);
        let systems = h.result(h.call("Drm.getSupportedDRMSystemIDs", &token, json!({})));
        assert_eq!(systems[0]["DRMSystem"], json!(SYSTEM));
        assert_eq!(systems[0]["status"], json!(0));
    }

    #[test]
    fn test_send_message_returns_id_and_emits_result() {
        let h = Harness::new();
        let token = h.token(2);
        let response = h.call(
            "Drm.sendDRMMessage",
            &token,
            json!({ "msgID": "42", "msgType": "application/vnd.oipf.cspg", "msg": "", "DRMSystemID": SYSTEM }),
        );
        assert_eq!(response, h.ok(json!("42")));
        let events = h.events.take();
        assert_eq!(events[0].event, names::DRM_MESSAGE_RESULT);
        assert_eq!(events[0].properties["msgID"], json!("42"));
    }

    #[test]
    fn test_set_active_drm_requires_running_app() {
        let h = Harness::new();
        let idle = h.token(2);
        assert_eq!(
            h.call("Drm.setActiveDRM", &idle, json!({ "DRMSystemID": SYSTEM })),
            h.err("SecurityError")
        );
        assert!(h.terminal.active_drm().is_none());

        let running = h.launch(2);
        assert_eq!(
            h.call("Drm.setActiveDRM", &running, json!({ "DRMSystemID": SYSTEM })),
            h.ok(json!(true))
        );
    }
}
