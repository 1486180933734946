//! Variable-length integer and zig-zag coding.
//!

/// Most-significant byte, == 0x80
pub const MSB: u8 = 0b1000_0000;
/// All bits except for the most significant. Can be used as bitmask to drop the most-signficant
/// bit using `&` (binary-and).
const DROP_MSB: u8 = 0b0111_1111;

/// Longest encoding of any protobuf varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Number of 7-bit groups that contribute to a 32-bit varint.
const VARINT32_GROUPS: usize = 5;

/// Reasons a varint could not be decoded from a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarintError {
    /// The slice ended while the continuation bit was still set.
    Truncated,
    /// The varint terminates, but only after more than ten bytes.
    TooLong,
}

/// Classify a slice whose first ten bytes all carry the continuation bit.
///
/// Running into the end of the slice is truncation no matter how many continuation bytes came
/// first; only a terminator that shows up after the tenth byte is an overlong varint.
fn unterminated(src: &[u8]) -> VarintError {
    if src.iter().any(|b| b & MSB == 0) {
        VarintError::TooLong
    } else {
        VarintError::Truncated
    }
}

/// Decode a variable-length integer from the front of a byte slice.
///
/// Returns the value together with the number of bytes it occupied.
pub fn decode_varint(src: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut result: u64 = 0;

    for (i, b) in src.iter().take(MAX_VARINT_LEN).enumerate() {
        result |= u64::from(b & DROP_MSB) << (7 * i);
        if b & MSB == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(unterminated(src))
}

/// Decode a varint into a 32-bit accumulator.
///
/// Only the first five groups contribute to the value. Later groups are still consumed, which is
/// how negative `int32` values encoded as 64-bit varints come back as their low 32 bits.
pub fn decode_varint32(src: &[u8]) -> Result<(u32, usize), VarintError> {
    let mut result: u32 = 0;

    for (i, b) in src.iter().take(MAX_VARINT_LEN).enumerate() {
        if i < VARINT32_GROUPS {
            result |= u32::from(b & DROP_MSB) << (7 * i);
        }
        if b & MSB == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(unterminated(src))
}

/// Append the varint encoding of `value` to `buf`.
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= u64::from(MSB) {
        buf.push((value as u8 & DROP_MSB) | MSB);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Number of bytes `encode_varint` produces for `value`.
pub fn encoded_len_varint(value: u64) -> usize {
    // 1 + floor(log2(value | 1) / 7)
    ((64 - (value | 1).leading_zeros() as usize) + 6) / 7
}

/// Zig-zag decode a 32-bit value: 0, 1, 2, 3, 4 map to 0, -1, 1, -2, 2.
pub fn decode_zigzag32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Zig-zag encode a 32-bit value.
pub fn encode_zigzag32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

/// Zig-zag decode a 64-bit value.
pub fn decode_zigzag64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Zig-zag encode a 64-bit value.
pub fn encode_zigzag64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}
