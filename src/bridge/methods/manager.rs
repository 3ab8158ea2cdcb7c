//! `Manager.*` and `Network.*`: key sets, soft keyboard, name resolution.

use crate::bridge::registry::{MethodTable, result};
use crate::security::SecurityLevel::{AnyApp, RunningAppOnly};

pub fn register(table: &mut MethodTable) {
    // An absent otherKeys is an empty list, not an error.
    table.register("Manager.setKeyValue", RunningAppOnly, |inv| {
        let value = inv.params.required_i32("value")?;
        let other_keys = inv.params.optional_str_list("otherKeys")?;
        result(
            inv.terminal
                .manager
                .set_key_value(inv.caller.app_id, value, &other_keys),
        )
    });

    table.register("Manager.getKeyIcon", AnyApp, |inv| {
        let code = inv.params.required_i32("code")?;
        result(inv.terminal.manager.key_icon(code))
    });

    table.register("Manager.showSoftwareKeyboard", AnyApp, |inv| {
        let input_type = inv.params.optional_str("type", "text")?;
        result(inv.terminal.manager.show_software_keyboard(input_type))
    });

    table.register("Network.resolveHostAddress", AnyApp, |inv| {
        let hostname = inv.params.required_str("hostname")?;
        let ip_version = inv.params.optional_i32("ipVersion", 4)?;
        result(
            inv.terminal
                .manager
                .resolve_host_address(hostname, ip_version),
        )
    });
}
