//! Property-based tests for AIT section encoding.
//!
//! Uses proptest to generate random application lists and verify that:
//! 1. Encoding is deterministic and always ends in a zero CRC
//! 2. Encoded sections parse back to the applications they were built from
//! 3. Every declared length matches the bytes it covers

use orb_ait::{encode_section, parse_section, AitVersion, Application, SectionEncoder};
use proptest::prelude::*;

/// `organisation_id` + `application_id` + control code + descriptor loop length.
const APPLICATION_HEADER_LEN: usize = 9;

// =============================================================================
// STRATEGIES - Generators for applications that fit their fields
// =============================================================================

/// Any UTF-8 name short enough for the name descriptor.
fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("\\PC{0,24}").expect("valid regex")
}

fn base_url_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("https?://[a-z0-9]{1,12}(\\.[a-z]{2,5}){0,2}/([a-z0-9_-]{1,8}/){0,3}")
        .expect("valid regex")
}

fn initial_path_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_./?=&-]{0,40}").expect("valid regex")
}

fn application_strategy() -> impl Strategy<Value = Application> {
    (
        0..=u32::from(u16::MAX),
        0..=u64::from(u32::MAX),
        name_strategy(),
        base_url_strategy(),
        initial_path_strategy(),
    )
        .prop_map(|(id, org_id, name, base_url, initial_path)| {
            Application::new(id, org_id, name, base_url, initial_path)
        })
}

fn applications_strategy() -> impl Strategy<Value = Vec<Application>> {
    prop::collection::vec(application_strategy(), 0..6)
}

fn version_strategy() -> impl Strategy<Value = AitVersion> {
    (0u8..32).prop_map(AitVersion::new)
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    /// Identical input always produces identical bytes.
    #[test]
    fn encoding_is_deterministic(apps in applications_strategy(), version in version_strategy()) {
        let first = encode_section(&apps, version).expect("valid input");
        let second = encode_section(&apps, version).expect("valid input");
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first[first.len() - 4..], &[0u8, 0, 0, 0][..]);
    }

    /// encode → parse yields the applications in signalled order.
    #[test]
    fn section_roundtrip(apps in applications_strategy(), version in version_strategy()) {
        let bytes = encode_section(&apps, version).expect("valid input");
        let section = parse_section(&bytes).expect("encoded section should parse");

        prop_assert_eq!(section.table_id, 0x74);
        prop_assert_eq!(section.version, version);
        prop_assert_eq!(section.crc32, 0);
        prop_assert_eq!(section.applications.len(), apps.len());

        for (parsed, app) in section.applications.iter().zip(&apps) {
            prop_assert_eq!(u32::from(parsed.id), app.id);
            prop_assert_eq!(u64::from(parsed.org_id), app.org_id);
            prop_assert_eq!(&parsed.name, &app.name);
            prop_assert_eq!(&parsed.base_url, &app.base_url);
            prop_assert_eq!(&parsed.initial_path, &app.initial_path);
        }
    }

    /// section_length covers everything after it, and the loop lengths nest.
    #[test]
    fn declared_lengths_add_up(apps in applications_strategy(), version in version_strategy()) {
        let encoder = SectionEncoder::new(&apps, version).expect("valid input");
        let declared_section = encoder.section_length();
        let declared_loop = encoder.application_loop_length();
        let bytes = encoder.finish();
        let section = parse_section(&bytes).expect("encoded section should parse");

        prop_assert_eq!(usize::from(section.section_length), bytes.len() - 3);
        prop_assert_eq!(usize::from(section.section_length), declared_section);
        prop_assert_eq!(usize::from(section.application_loop_length), declared_loop);

        let groups: usize = section
            .applications
            .iter()
            .map(|a| APPLICATION_HEADER_LEN + usize::from(a.descriptors_loop_length))
            .sum();
        prop_assert_eq!(groups, usize::from(section.application_loop_length));
    }
}
