//! AIT section parser.
//!
//! Reads back the sections produced by [`crate::section`]. Only the four
//! descriptor kinds the encoder emits are understood; anything else is an
//! error. Every length field is cross-checked against the bytes it covers.

use crate::bits::BitReader;
use crate::error::{AitError, Result};
use crate::section::{
    AitVersion, AIT_TABLE_ID, APPLICATION_HEADER_LEN, CRC_LEN, SECTION_HEADER_TAIL_LEN,
    TAG_APPLICATION, TAG_APPLICATION_NAME, TAG_SIMPLE_APPLICATION_LOCATION,
    TAG_TRANSPORT_PROTOCOL,
};

/// A decoded AIT section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AitSection {
    /// `table_id`, always `0x74`.
    pub table_id: u8,
    /// `section_length` as read.
    pub section_length: u16,
    /// `test_application_flag`.
    pub test_application: bool,
    /// `application_type`.
    pub application_type: u16,
    /// `version_number`.
    pub version: AitVersion,
    /// `current_next_indicator`.
    pub current_next: bool,
    /// `application_loop_length` as read.
    pub application_loop_length: u16,
    /// Applications in signalled order.
    pub applications: Vec<ParsedApplication>,
    /// Trailing `CRC_32` field.
    pub crc32: u32,
}

/// One application entry of a decoded section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedApplication {
    /// `organisation_id`.
    pub org_id: u32,
    /// `application_id`.
    pub id: u16,
    /// `application_control_code`.
    pub control_code: u8,
    /// `application_descriptors_loop_length` as read.
    pub descriptors_loop_length: u16,
    /// `application_profile` from the application descriptor.
    pub profile: u16,
    /// `application_priority` from the application descriptor.
    pub priority: u8,
    /// ISO 639 language code of the name.
    pub language: String,
    /// Application name.
    pub name: String,
    /// `protocol_id` from the transport protocol descriptor.
    pub protocol_id: u16,
    /// URL base from the transport protocol descriptor.
    pub base_url: String,
    /// Initial path from the simple application location descriptor.
    pub initial_path: String,
}

/// Parse a complete section.
pub fn parse_section(bytes: &[u8]) -> Result<AitSection> {
    let mut r = BitReader::new(bytes);

    let table_id = r.take(8)? as u8;
    if table_id != AIT_TABLE_ID {
        return Err(AitError::UnexpectedTableId(table_id));
    }
    let _section_syntax_indicator = r.take(1)?;
    let _reserved = r.take(3)?;
    let section_length = r.take(12)? as u16;
    expect_len("section_length", section_length as usize, bytes.len() - 3)?;

    let test_application = r.take(1)? == 1;
    let application_type = r.take(15)? as u16;
    let _reserved = r.take(2)?;
    let version = AitVersion::new(r.take(5)? as u8);
    let current_next = r.take(1)? == 1;
    let _section_number = r.take(8)?;
    let _last_section_number = r.take(8)?;
    let _reserved = r.take(4)?;
    let common_descriptors_length = r.take(12)? as usize;
    r.take_bytes(common_descriptors_length)?;
    let _reserved = r.take(4)?;
    let application_loop_length = r.take(12)? as u16;

    let loop_available = (section_length as usize)
        .saturating_sub(SECTION_HEADER_TAIL_LEN + common_descriptors_length + CRC_LEN);
    expect_len("application_loop_length", application_loop_length as usize, loop_available)?;

    let loop_bytes = r.take_bytes(application_loop_length as usize)?;
    let applications = parse_application_loop(loop_bytes)?;
    let crc32 = r.take(32)? as u32;

    Ok(AitSection {
        table_id,
        section_length,
        test_application,
        application_type,
        version,
        current_next,
        application_loop_length,
        applications,
        crc32,
    })
}

fn parse_application_loop(bytes: &[u8]) -> Result<Vec<ParsedApplication>> {
    let mut r = BitReader::new(bytes);
    let mut applications = Vec::new();

    while r.remaining_bits() > 0 {
        if r.remaining_bits() < APPLICATION_HEADER_LEN * 8 {
            return Err(AitError::Truncated {
                offset: r.position(),
                needed: (APPLICATION_HEADER_LEN * 8) as u32,
            });
        }
        let mut app = ParsedApplication {
            org_id: r.take(32)? as u32,
            id: r.take(16)? as u16,
            control_code: r.take(8)? as u8,
            ..Default::default()
        };
        let _reserved = r.take(4)?;
        app.descriptors_loop_length = r.take(12)? as u16;

        let descriptors = r.take_bytes(app.descriptors_loop_length as usize)?;
        parse_descriptors(descriptors, &mut app)?;
        applications.push(app);
    }

    Ok(applications)
}

fn parse_descriptors(bytes: &[u8], app: &mut ParsedApplication) -> Result<()> {
    let mut r = BitReader::new(bytes);

    while r.remaining_bits() > 0 {
        let tag = r.take(8)? as u8;
        let len = r.take(8)? as usize;
        let body = r.take_bytes(len)?;
        let mut b = BitReader::new(body);

        match tag {
            TAG_APPLICATION => {
                let profiles_len = b.take(8)? as usize;
                let profiles = b.take_bytes(profiles_len)?;
                if profiles.len() >= 2 {
                    app.profile = u16::from_be_bytes([profiles[0], profiles[1]]);
                }
                let _flags = b.take(8)?;
                app.priority = b.take(8)? as u8;
            }
            TAG_APPLICATION_NAME => {
                app.language = text(b.take_bytes(3)?, "ISO_639_language_code")?;
                let name_len = b.take(8)? as usize;
                expect_len("application_name_length", name_len, body.len() - 4)?;
                app.name = text(b.take_bytes(name_len)?, "application_name")?;
            }
            TAG_TRANSPORT_PROTOCOL => {
                app.protocol_id = b.take(16)? as u16;
                let _label = b.take(8)?;
                let url_len = b.take(8)? as usize;
                app.base_url = text(b.take_bytes(url_len)?, "URL_base")?;
                let _extension_count = b.take(8)?;
            }
            TAG_SIMPLE_APPLICATION_LOCATION => {
                app.initial_path = text(body, "initial_path_bytes")?;
            }
            other => return Err(AitError::UnexpectedDescriptor(other)),
        }
    }

    Ok(())
}

fn expect_len(field: &'static str, declared: usize, actual: usize) -> Result<()> {
    if declared != actual {
        return Err(AitError::LengthMismatch {
            field,
            declared,
            actual,
        });
    }
    Ok(())
}

fn text(bytes: &[u8], field: &'static str) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| AitError::InvalidText(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use crate::section::{encode_section, HBBTV_APPLICATION_TYPE};

    #[test]
    fn test_parse_encoded_section() {
        let apps = vec![
            Application::new(1, 999, "Test", "http://x/", "index.html"),
            Application::new(0x2A, 0x10, "Zweite", "https://example.org/app/", "?launch=1"),
        ];
        let bytes = encode_section(&apps, AitVersion::new(17)).unwrap();
        let section = parse_section(&bytes).unwrap();

        assert_eq!(section.table_id, AIT_TABLE_ID);
        assert_eq!(section.application_type, HBBTV_APPLICATION_TYPE);
        assert_eq!(section.version.value(), 17);
        assert!(section.current_next);
        assert!(!section.test_application);
        assert_eq!(section.crc32, 0);
        assert_eq!(section.section_length as usize, bytes.len() - 3);

        let second = &section.applications[1];
        assert_eq!(second.id, 0x2A);
        assert_eq!(second.org_id, 0x10);
        assert_eq!(second.language, "eng");
        assert_eq!(second.name, "Zweite");
        assert_eq!(second.protocol_id, 0x0003);
        assert_eq!(second.base_url, "https://example.org/app/");
        assert_eq!(second.initial_path, "?launch=1");
        assert_eq!(second.priority, 1);
    }

    #[test]
    fn test_wrong_table_id() {
        let mut bytes = encode_section(&[], AitVersion::new(0)).unwrap();
        bytes[0] = 0x42;
        assert_eq!(parse_section(&bytes), Err(AitError::UnexpectedTableId(0x42)));
    }

    #[test]
    fn test_truncated_section() {
        let apps = [Application::new(1, 1, "a", "http://a/", "b")];
        let bytes = encode_section(&apps, AitVersion::new(0)).unwrap();
        assert!(matches!(
            parse_section(&bytes[..bytes.len() - 6]),
            Err(AitError::LengthMismatch { field: "section_length", .. })
        ));
    }

    #[test]
    fn test_unknown_descriptor_tag() {
        let apps = [Application::new(1, 1, "a", "http://a/", "b")];
        let mut bytes = encode_section(&apps, AitVersion::new(0)).unwrap();
        // first descriptor tag sits after the 12-byte header and 9-byte app header
        bytes[21] = 0x7F;
        assert_eq!(parse_section(&bytes), Err(AitError::UnexpectedDescriptor(0x7F)));
    }
}
