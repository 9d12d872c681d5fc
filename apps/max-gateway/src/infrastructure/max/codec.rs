//! Fixed-Width Field Codec
//!
//! Every MAX wire field is ASCII text at a fixed byte offset and width:
//! numeric fields are left-zero-padded decimal, character fields are
//! right-space-padded. These primitives read and write single fields;
//! the message catalog composes them into whole-frame encode/decode pairs.
//!
//! Decode semantics: character fields are trimmed, numeric fields are
//! whitespace-trimmed and then strictly parsed — a non-numeric byte fails
//! the decode of the whole frame.

use std::ops::Range;

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The byte slice is shorter than the type's fixed width.
    #[error("frame too short: need {need} bytes, have {have}")]
    ShortFrame {
        /// Bytes required by the fixed layout.
        need: usize,
        /// Bytes actually present.
        have: usize,
    },

    /// The frame does not open with the start-of-text marker.
    #[error("missing start marker")]
    BadMarker,

    /// A numeric field failed strict decimal parsing.
    #[error("field {field} is not a number: {value:?}")]
    BadNumber {
        /// Wire name of the offending field.
        field: &'static str,
        /// The raw (trimmed) field content.
        value: String,
    },
}

/// Fail unless `buf` holds at least `need` bytes.
pub(crate) fn ensure_len(buf: &[u8], need: usize) -> Result<(), CodecError> {
    if buf.len() < need {
        return Err(CodecError::ShortFrame {
            need,
            have: buf.len(),
        });
    }
    Ok(())
}

/// Write a character field, right-padded with spaces and truncated to fit.
pub(crate) fn write_text(buf: &mut [u8], range: Range<usize>, value: &str) {
    let field = &mut buf[range];
    let bytes = value.as_bytes();
    let n = bytes.len().min(field.len());
    field[..n].copy_from_slice(&bytes[..n]);
    field[n..].fill(b' ');
}

/// Write a numeric field, left-padded with zeros. Values wider than the
/// field keep their least-significant digits.
pub(crate) fn write_digits(buf: &mut [u8], range: Range<usize>, value: u64) {
    let field = &mut buf[range];
    let digits = format!("{value:0width$}", width = field.len());
    let bytes = digits.as_bytes();
    field.copy_from_slice(&bytes[bytes.len() - field.len()..]);
}

/// Write a single-character field.
pub(crate) fn write_char(buf: &mut [u8], at: usize, value: char) {
    buf[at] = u8::try_from(u32::from(value)).unwrap_or(b' ');
}

/// Read a character field with trim semantics.
pub(crate) fn read_text(buf: &[u8], range: Range<usize>) -> String {
    String::from_utf8_lossy(&buf[range]).trim().to_owned()
}

/// Read a numeric field with strict parsing after whitespace trim.
pub(crate) fn read_digits(
    buf: &[u8],
    range: Range<usize>,
    field: &'static str,
) -> Result<u64, CodecError> {
    let raw = String::from_utf8_lossy(&buf[range]);
    let trimmed = raw.trim();
    trimmed.parse().map_err(|_| CodecError::BadNumber {
        field,
        value: trimmed.to_owned(),
    })
}

/// Read a single-character field.
pub(crate) fn read_char(buf: &[u8], at: usize) -> char {
    char::from(buf[at])
}
