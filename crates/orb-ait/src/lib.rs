//! # orb-ait
//!
//! Encoder and parser for broadcast Application Information Table (AIT)
//! sections, as carried on table id `0x74`.
//!
//! The encoder synthesises the signalling that a terminal would normally
//! receive from the broadcast network: one section listing the applications
//! of a service, each with an application descriptor, a name descriptor, a
//! transport protocol descriptor and a simple application location
//! descriptor.
//!
//! ## Quick Start
//!
//! ```rust
//! use orb_ait::{encode_section, parse_section, Application, AitVersion};
//!
//! let apps = vec![Application::new(1, 999, "Test", "http://x/", "index.html")];
//! let bytes = encode_section(&apps, AitVersion::new(0)).expect("valid input");
//!
//! let section = parse_section(&bytes).expect("well-formed section");
//! assert_eq!(section.table_id, 0x74);
//! assert_eq!(section.applications[0].name, "Test");
//! ```
//!
//! ## Length fields
//!
//! Every length field is computed bottom-up before the first bit is written:
//! descriptor bodies first, then each application's descriptor loop, then
//! the application loop, then the section. Input that does not fit a field's
//! bit width is rejected with [`AitError::EncodingConstraintViolation`] and
//! no bytes are produced.
//!
//! The trailing CRC32 field is always written as zero.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod application;
pub mod bits;
pub mod error;
pub mod parse;
pub mod section;

pub use self::application::Application;
pub use self::bits::{BitReader, BitWriter};
pub use self::error::{AitError, Result};
pub use self::parse::{parse_section, AitSection, ParsedApplication};
pub use self::section::{encode_section, AitVersion, SectionEncoder, AIT_TABLE_ID};
