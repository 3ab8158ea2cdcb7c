//! Bit-level cursors over byte buffers.
//!
//! AIT fields are packed MSB-first with widths that rarely line up with
//! byte boundaries (a 3-bit reserved run followed by a 12-bit length, a
//! 5-bit version number, ...). [`BitWriter`] appends fields to a growing
//! buffer and [`BitReader`] reads them back in the same order.
//!
//! # Example
//!
//! ```
//! use orb_ait::bits::{BitReader, BitWriter};
//!
//! let mut w = BitWriter::new();
//! w.insert(0x74, 8);
//! w.insert(1, 1);
//! w.insert(0b111, 3);
//! w.insert(0x00A, 12);
//! assert_eq!(w.as_bytes(), &[0x74, 0xF0, 0x0A]);
//!
//! let mut r = BitReader::new(w.as_bytes());
//! assert_eq!(r.take(8).unwrap(), 0x74);
//! assert_eq!(r.take(4).unwrap(), 0xF);
//! assert_eq!(r.take(12).unwrap(), 0x00A);
//! ```

use crate::error::{AitError, Result};

/// Append-only bit cursor.
///
/// The buffer is extended with zero bytes as bits are inserted. The cursor
/// is not reusable across sections: build a new writer per encode.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    buf: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            bit_len: 0,
        }
    }

    /// Write the `n_bits` least-significant bits of `value`, MSB first.
    ///
    /// Bits of `value` above `n_bits` are ignored. `n_bits` must be at most 64.
    pub fn insert(&mut self, value: u64, n_bits: u32) {
        debug_assert!(n_bits <= 64, "insert of {n_bits} bits");
        for i in (0..n_bits).rev() {
            let bit = (value >> i) & 1;
            let byte_index = self.bit_len / 8;
            if byte_index == self.buf.len() {
                self.buf.push(0);
            }
            if bit == 1 {
                self.buf[byte_index] |= 0x80 >> (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
    }

    /// Write a run of bytes. The cursor need not be byte-aligned.
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        if self.bit_len % 8 == 0 {
            self.buf.extend_from_slice(bytes);
            self.bit_len += bytes.len() * 8;
        } else {
            for &b in bytes {
                self.insert(u64::from(b), 8);
            }
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Whether the cursor sits on a byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.bit_len % 8 == 0
    }

    /// The bytes written so far; a partial final byte is zero-padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Sequential bit reader, the inverse of [`BitWriter`].
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read `n_bits` (at most 64) as an unsigned value, MSB first.
    pub fn take(&mut self, n_bits: u32) -> Result<u64> {
        debug_assert!(n_bits <= 64, "take of {n_bits} bits");
        if self.remaining_bits() < n_bits as usize {
            return Err(AitError::Truncated {
                offset: self.pos,
                needed: n_bits,
            });
        }
        let mut value = 0u64;
        for _ in 0..n_bits {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - (self.pos % 8))) & 1;
            value = (value << 1) | u64::from(bit);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Read `len` whole bytes. The cursor must be byte-aligned.
    pub fn take_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        debug_assert!(self.pos % 8 == 0, "unaligned byte read");
        let start = self.pos / 8;
        if self.data.len() < start + len {
            return Err(AitError::Truncated {
                offset: self.pos,
                needed: u32::try_from(len * 8).unwrap_or(u32::MAX),
            });
        }
        self.pos += len * 8;
        Ok(&self.data[start..start + len])
    }

    /// Bits left to read.
    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// Current position in bits from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }
}
