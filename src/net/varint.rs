//! The protocol's variable-length integer: 7 payload bits per byte, least
//! significant group first, high bit set on every byte but the last.
//!
//! Negative values are written as their two's complement `u32`, so they always
//! take the full five bytes.

use thiserror::Error;

/// A VarInt never occupies more than this many bytes.
pub const MAX_VARINT_LEN: usize = 5;

const SEGMENT_BITS: u8 = 0x7f;
const CONTINUE_BIT: u8 = 0x80;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntError {
    /// The buffer ended before the terminating byte. More data may still
    /// arrive, so this is not corruption.
    #[error("varint is incomplete")]
    Incomplete,
    /// The continuation bit was still set on the fifth byte.
    #[error("varint is longer than {MAX_VARINT_LEN} bytes")]
    TooLong,
}

impl VarIntError {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, VarIntError::Incomplete)
    }
}

pub fn encode(value: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    write(&mut out, value);
    out
}

/// Appends the minimal encoding of `value` to `out`.
pub fn write(out: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        let segment = (value & u32::from(SEGMENT_BITS)) as u8;
        value >>= 7;
        if value == 0 {
            out.push(segment);
            return;
        }
        out.push(segment | CONTINUE_BIT);
    }
}

pub fn encoded_len(value: i32) -> usize {
    let value = value as u32;
    match value {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        0x4000..=0x1f_ffff => 3,
        0x20_0000..=0x0fff_ffff => 4,
        _ => 5,
    }
}

/// Decodes a VarInt starting at `offset`, returning the value and the number
/// of bytes it occupied.
pub fn decode(buf: &[u8], offset: usize) -> Result<(i32, usize), VarIntError> {
    let mut value: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        let Some(&byte) = buf.get(offset + i) else {
            return Err(VarIntError::Incomplete);
        };
        value |= u32::from(byte & SEGMENT_BITS) << (7 * i);
        if byte & CONTINUE_BIT == 0 {
            return Ok((value as i32, i + 1));
        }
    }
    Err(VarIntError::TooLong)
}
