//! `Configuration.*`: read-only terminal properties and the
//! distinctive-identifier consent flow.
//!
//! The identifier is always scoped to the origin carried in the caller's
//! token, never to a parameter.

use crate::bridge::registry::{MethodTable, result, void};
use crate::security::SecurityLevel::AnyApp;

pub fn register(table: &mut MethodTable) {
    table.register("Configuration.getCapabilities", AnyApp, |inv| {
        result(inv.terminal.configuration.capabilities())
    });

    table.register("Configuration.getAudioProfiles", AnyApp, |inv| {
        result(inv.terminal.configuration.audio_profiles())
    });

    table.register("Configuration.getVideoProfiles", AnyApp, |inv| {
        result(inv.terminal.configuration.video_profiles())
    });

    table.register("Configuration.getLocalSystem", AnyApp, |inv| {
        result(inv.terminal.configuration.local_system())
    });

    table.register("Configuration.getPreferredAudioLanguage", AnyApp, |inv| {
        result(inv.terminal.configuration.preferred_audio_language())
    });

    table.register("Configuration.getPreferredSubtitleLanguage", AnyApp, |inv| {
        result(inv.terminal.configuration.preferred_subtitle_language())
    });

    table.register("Configuration.getPreferredUILanguage", AnyApp, |inv| {
        result(inv.terminal.configuration.preferred_ui_language())
    });

    table.register("Configuration.getCountryId", AnyApp, |inv| {
        result(inv.terminal.configuration.country_id())
    });

    table.register("Configuration.getSubtitlesEnabled", AnyApp, |inv| {
        result(inv.terminal.configuration.subtitles_enabled())
    });

    table.register("Configuration.getAudioDescriptionEnabled", AnyApp, |inv| {
        result(inv.terminal.configuration.audio_description_enabled())
    });

    table.register("Configuration.getDistinctiveIdentifier", AnyApp, |inv| {
        result(
            inv.terminal
                .configuration
                .distinctive_identifier(&inv.caller.origin),
        )
    });

    table.register(
        "Configuration.requestAccessToDistinctiveIdentifier",
        AnyApp,
        |inv| {
            inv.terminal
                .configuration
                .request_access_to_distinctive_identifier(&inv.caller.origin);
            void()
        },
    );
}
