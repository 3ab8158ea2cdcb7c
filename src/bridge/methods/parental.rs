//! `ParentalControl.*`

use crate::bridge::registry::{MethodTable, result};
use crate::security::SecurityLevel::AnyApp;

pub fn register(table: &mut MethodTable) {
    table.register("ParentalControl.getRatingSchemes", AnyApp, |inv| {
        result(inv.terminal.parental.rating_schemes())
    });

    table.register("ParentalControl.getThreshold", AnyApp, |inv| {
        let scheme = inv.params.required_str("scheme")?;
        result(inv.terminal.parental.threshold(scheme))
    });

    table.register("ParentalControl.isRatingBlocked", AnyApp, |inv| {
        let p = inv.params;
        let scheme = p.required_str("scheme")?;
        let region = p.optional_str("region", "")?;
        let value = p.required_i32("value")?;
        result(inv.terminal.parental.is_rating_blocked(scheme, region, value))
    });
}
