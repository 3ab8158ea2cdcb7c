//! AIT section encoder.
//!
//! Layout of one section (bit widths in brackets):
//!
//! ```text
//! table_id[8]=0x74  section_syntax_indicator[1]=1  reserved[3]  section_length[12]
//! test_application_flag[1]=0  application_type[15]=0x0010
//! reserved[2]  version_number[5]  current_next_indicator[1]=1
//! section_number[8]=0  last_section_number[8]=0
//! reserved[4]  common_descriptors_length[12]=0
//! reserved[4]  application_loop_length[12]
//!   per application:
//!     organisation_id[32]  application_id[16]  application_control_code[8]=0x01
//!     reserved[4]  application_descriptors_loop_length[12]
//!     application_descriptor        (tag 0x00)
//!     application_name_descriptor   (tag 0x01)
//!     transport_protocol_descriptor (tag 0x02)
//!     simple_application_location   (tag 0x15)
//! CRC_32[32]=0
//! ```

use crate::application::Application;
use crate::bits::BitWriter;
use crate::error::{AitError, Result};

/// Table id of an Application Information Table section.
pub const AIT_TABLE_ID: u8 = 0x74;

/// `application_type` for HbbTV applications.
pub const HBBTV_APPLICATION_TYPE: u16 = 0x0010;

/// `application_control_code` AUTOSTART.
pub const CONTROL_CODE_AUTOSTART: u8 = 0x01;

pub(crate) const TAG_APPLICATION: u8 = 0x00;
pub(crate) const TAG_APPLICATION_NAME: u8 = 0x01;
pub(crate) const TAG_TRANSPORT_PROTOCOL: u8 = 0x02;
pub(crate) const TAG_SIMPLE_APPLICATION_LOCATION: u8 = 0x15;

/// `protocol_id` for HTTP transport.
pub(crate) const PROTOCOL_HTTP: u16 = 0x0003;
pub(crate) const TRANSPORT_PROTOCOL_LABEL: u8 = 1;
pub(crate) const NAME_LANGUAGE: &[u8; 3] = b"eng";

const APPLICATION_DESCRIPTOR_BODY_LEN: usize = 9;
const DESCRIPTOR_HEADER_LEN: usize = 2;
/// Bytes between `section_length` and the application loop.
pub(crate) const SECTION_HEADER_TAIL_LEN: usize = 9;
/// Bytes before the descriptor loop of each application.
pub(crate) const APPLICATION_HEADER_LEN: usize = 9;
pub(crate) const CRC_LEN: usize = 4;

const MAX_DESCRIPTOR_LEN: usize = 0xFF;
const MAX_LOOP_LEN: usize = 0x0FFF;

/// 5-bit AIT `version_number`.
///
/// Each change of the signalled application set bumps the version so that
/// a parser can tell the table changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AitVersion(u8);

impl AitVersion {
    /// Create a version, reducing `v` modulo 32.
    pub fn new(v: u8) -> Self {
        Self(v % 32)
    }

    /// The version following this one, wrapping from 31 to 0.
    #[must_use]
    pub fn next(self) -> Self {
        Self((self.0 + 1) % 32)
    }

    /// Raw 5-bit value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for AitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Byte lengths of one application's descriptors, computed before encoding.
#[derive(Debug, Clone, Copy)]
struct ApplicationLayout {
    name_body: usize,
    transport_body: usize,
    location_body: usize,
    descriptors_loop: usize,
}

impl ApplicationLayout {
    fn compute(app: &Application) -> Result<Self> {
        app.validate()?;

        let name_body = NAME_LANGUAGE.len() + 1 + app.name.len();
        let transport_body = 2 + 1 + 1 + app.base_url.len() + 1;
        let location_body = app.initial_path.len();

        check_width("application_name_descriptor.descriptor_length", name_body, MAX_DESCRIPTOR_LEN, 8)?;
        check_width("transport_protocol_descriptor.descriptor_length", transport_body, MAX_DESCRIPTOR_LEN, 8)?;
        check_width("simple_application_location_descriptor.descriptor_length", location_body, MAX_DESCRIPTOR_LEN, 8)?;

        let descriptors_loop = DESCRIPTOR_HEADER_LEN * 4
            + APPLICATION_DESCRIPTOR_BODY_LEN
            + name_body
            + transport_body
            + location_body;
        check_width("application_descriptors_loop_length", descriptors_loop, MAX_LOOP_LEN, 12)?;

        Ok(Self {
            name_body,
            transport_body,
            location_body,
            descriptors_loop,
        })
    }

    fn group_len(&self) -> usize {
        APPLICATION_HEADER_LEN + self.descriptors_loop
    }
}

fn check_width(field: &'static str, len: usize, max: usize, bits: u32) -> Result<()> {
    if len > max {
        return Err(AitError::too_wide(field, len as u64, bits));
    }
    Ok(())
}

/// One-shot section builder.
///
/// [`SectionEncoder::new`] validates the input and computes every length
/// field; [`SectionEncoder::finish`] consumes the builder and writes the
/// bytes. Nothing is written if validation fails.
#[derive(Debug)]
pub struct SectionEncoder<'a> {
    applications: &'a [Application],
    layouts: Vec<ApplicationLayout>,
    version: AitVersion,
    application_loop_length: usize,
    section_length: usize,
}

impl<'a> SectionEncoder<'a> {
    /// Validate `applications` and compute the section's length fields.
    pub fn new(applications: &'a [Application], version: AitVersion) -> Result<Self> {
        let layouts = applications
            .iter()
            .map(ApplicationLayout::compute)
            .collect::<Result<Vec<_>>>()?;

        let application_loop_length: usize = layouts.iter().map(ApplicationLayout::group_len).sum();
        check_width("application_loop_length", application_loop_length, MAX_LOOP_LEN, 12)?;

        let section_length = SECTION_HEADER_TAIL_LEN + application_loop_length + CRC_LEN;
        check_width("section_length", section_length, MAX_LOOP_LEN, 12)?;

        Ok(Self {
            applications,
            layouts,
            version,
            application_loop_length,
            section_length,
        })
    }

    /// Total size of the encoded section in bytes.
    pub fn encoded_len(&self) -> usize {
        3 + self.section_length
    }

    /// Value of the `section_length` field.
    pub fn section_length(&self) -> usize {
        self.section_length
    }

    /// Value of the `application_loop_length` field.
    pub fn application_loop_length(&self) -> usize {
        self.application_loop_length
    }

    /// Write the section.
    pub fn finish(self) -> Vec<u8> {
        let mut w = BitWriter::with_capacity(self.encoded_len());

        w.insert(u64::from(AIT_TABLE_ID), 8);
        w.insert(1, 1); // section_syntax_indicator
        w.insert(0b111, 3);
        w.insert(self.section_length as u64, 12);
        w.insert(0, 1); // test_application_flag
        w.insert(u64::from(HBBTV_APPLICATION_TYPE), 15);
        w.insert(0b11, 2);
        w.insert(u64::from(self.version.value()), 5);
        w.insert(1, 1); // current_next_indicator
        w.insert(0, 8); // section_number
        w.insert(0, 8); // last_section_number
        w.insert(0xF, 4);
        w.insert(0, 12); // common_descriptors_length
        w.insert(0xF, 4);
        w.insert(self.application_loop_length as u64, 12);

        for (app, layout) in self.applications.iter().zip(&self.layouts) {
            write_application(&mut w, app, layout);
        }

        w.insert(0, 32); // CRC_32 placeholder
        debug_assert_eq!(w.as_bytes().len(), self.encoded_len());
        w.into_bytes()
    }
}

fn write_application(w: &mut BitWriter, app: &Application, layout: &ApplicationLayout) {
    w.insert(app.org_id, 32);
    w.insert(u64::from(app.id), 16);
    w.insert(u64::from(CONTROL_CODE_AUTOSTART), 8);
    w.insert(0xF, 4);
    w.insert(layout.descriptors_loop as u64, 12);

    // application_descriptor
    w.insert(u64::from(TAG_APPLICATION), 8);
    w.insert(APPLICATION_DESCRIPTOR_BODY_LEN as u64, 8);
    w.insert(5, 8); // application_profiles_length
    w.insert(0x0000, 16); // application_profile
    w.insert(1, 8); // version.major
    w.insert(1, 8); // version.minor
    w.insert(1, 8); // version.micro
    w.insert(1, 1); // service_bound_flag
    w.insert(0b11, 2); // visibility
    w.insert(0x1F, 5);
    w.insert(1, 8); // application_priority
    w.insert(u64::from(TRANSPORT_PROTOCOL_LABEL), 8);

    // application_name_descriptor
    w.insert(u64::from(TAG_APPLICATION_NAME), 8);
    w.insert(layout.name_body as u64, 8);
    w.insert_bytes(NAME_LANGUAGE);
    w.insert(app.name.len() as u64, 8);
    w.insert_bytes(app.name.as_bytes());

    // transport_protocol_descriptor
    w.insert(u64::from(TAG_TRANSPORT_PROTOCOL), 8);
    w.insert(layout.transport_body as u64, 8);
    w.insert(u64::from(PROTOCOL_HTTP), 16);
    w.insert(u64::from(TRANSPORT_PROTOCOL_LABEL), 8);
    w.insert(app.base_url.len() as u64, 8);
    w.insert_bytes(app.base_url.as_bytes());
    w.insert(0, 8); // URL_extension_count

    // simple_application_location_descriptor
    w.insert(u64::from(TAG_SIMPLE_APPLICATION_LOCATION), 8);
    w.insert(layout.location_body as u64, 8);
    w.insert_bytes(app.initial_path.as_bytes());
}

/// Encode `applications` into a single AIT section.
///
/// Fails with [`AitError::EncodingConstraintViolation`] before producing
/// any output if an id, organisation id or length does not fit its field.
pub fn encode_section(applications: &[Application], version: AitVersion) -> Result<Vec<u8>> {
    Ok(SectionEncoder::new(applications, version)?.finish())
}
