//! Stream Frame Extraction
//!
//! MAX frames are self-delimited: a 1-byte start marker (`0x02`) followed by
//! a 4-digit ASCII decimal total frame length. The extractor slices complete
//! frames off the front of a growing receive buffer and leaves the remainder
//! buffered, so it can be called repeatedly as bytes arrive in arbitrary
//! chunks.
//!
//! There is no mid-buffer resynchronization: a corrupt leading byte (or
//! non-digit length) parks the buffer as "incomplete" until the connection is
//! torn down at a higher layer.

use bytes::{Bytes, BytesMut};

/// Start-of-text marker opening every frame.
pub const STX: u8 = 0x02;

/// Minimum buffered bytes before length-based framing can proceed
/// (marker + 4-digit length + at least one more byte).
pub const MIN_PREFIX: usize = 6;

/// Try to slice one complete frame off the front of `buf`.
///
/// Returns `None` while the buffer does not yet hold a complete frame; the
/// buffer is left untouched in that case and the call can simply be repeated
/// after more bytes arrive.
pub fn next_frame(buf: &mut BytesMut) -> Option<Bytes> {
    if buf.len() < MIN_PREFIX {
        return None;
    }
    if buf[0] != STX {
        return None;
    }

    let length = ascii_length(&buf[1..5])?;
    // A declared length shorter than the parseable prefix can never complete.
    if length < MIN_PREFIX {
        return None;
    }
    if buf.len() < length {
        return None;
    }

    Some(buf.split_to(length).freeze())
}

/// Parse a left-zero-padded ASCII decimal length field.
fn ascii_length(digits: &[u8]) -> Option<usize> {
    let mut length = 0usize;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        length = length * 10 + usize::from(b - b'0');
    }
    Some(length)
}
