//! Compact length prefix ("short vec") used throughout the native wire format.
//!
//! Each byte carries seven bits of the value, least significant group first,
//! with the high bit set on every byte but the last.  Lengths are `u16`, so an
//! encoding is at most three bytes long.

use crate::error::{Result, SmartAccountSdkError};

const MAX_ENCODING_LENGTH: usize = 3;

/// Decodes a compact length at the start of `bytes`.
///
/// Returns the value and the number of bytes it occupied.  Truncated, overlong
/// and non-canonical encodings (a zero continuation byte) are rejected.
pub fn decode_len(bytes: &[u8], field: &'static str) -> Result<(usize, usize)> {
    let mut value: usize = 0;
    for index in 0..MAX_ENCODING_LENGTH {
        let byte = *bytes
            .get(index)
            .ok_or_else(|| SmartAccountSdkError::malformed(field, "truncated length prefix"))?;
        if index > 0 && byte == 0 {
            return Err(SmartAccountSdkError::malformed(
                field,
                "non-canonical length prefix",
            ));
        }
        value |= usize::from(byte & 0x7f) << (index * 7);
        if byte & 0x80 == 0 {
            if value > usize::from(u16::MAX) {
                return Err(SmartAccountSdkError::malformed(field, "length prefix overflows u16"));
            }
            return Ok((value, index + 1));
        }
    }
    Err(SmartAccountSdkError::malformed(field, "length prefix longer than 3 bytes"))
}

/// Appends the compact encoding of `len`.
pub fn encode_len(mut len: u16, out: &mut Vec<u8>) {
    loop {
        let mut byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}
