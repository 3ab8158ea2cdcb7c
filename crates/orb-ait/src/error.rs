//! Error types for AIT encoding and parsing.

use thiserror::Error;

/// Convenience type alias for Results using [`AitError`].
pub type Result<T, E = AitError> = std::result::Result<T, E>;

/// Errors raised while encoding or parsing an AIT section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AitError {
    /// A value does not fit the bit width of the field it is written to.
    ///
    /// Raised before any byte of the section is produced.
    #[error("{field} = {value} does not fit in {bits} bits")]
    EncodingConstraintViolation {
        /// Name of the offending field (e.g. `application_id`).
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// Width of the field in bits.
        bits: u32,
    },

    /// The input ended before a field could be read.
    #[error("section truncated: needed {needed} bits at bit offset {offset}")]
    Truncated {
        /// Bit offset at which the read was attempted.
        offset: usize,
        /// Number of bits requested.
        needed: u32,
    },

    /// The first byte is not the AIT table id.
    #[error("unexpected table_id 0x{0:02x}")]
    UnexpectedTableId(u8),

    /// A descriptor inside an application loop carried an unknown tag.
    #[error("unexpected descriptor tag 0x{0:02x}")]
    UnexpectedDescriptor(u8),

    /// A declared length does not match the structure it covers.
    #[error("{field} declares {declared} bytes but {actual} are present")]
    LengthMismatch {
        /// Name of the length field.
        field: &'static str,
        /// Value read from the section.
        declared: usize,
        /// Bytes actually available for the structure.
        actual: usize,
    },

    /// A text field is not valid UTF-8.
    #[error("invalid UTF-8 in {0}")]
    InvalidText(&'static str),
}

impl AitError {
    /// Build a constraint violation for `field`.
    pub(crate) fn too_wide(field: &'static str, value: u64, bits: u32) -> Self {
        Self::EncodingConstraintViolation { field, value, bits }
    }

    /// Whether this error was raised by the encoder rather than the parser.
    pub fn is_encoding_error(&self) -> bool {
        matches!(self, Self::EncodingConstraintViolation { .. })
    }
}
