//! Bounds-checked reader over a borrowed byte region.

use crate::debug;
use crate::error::{DecodeError, Result};
use crate::varint::{self, VarintError};
use crate::wire::Tag;

/// A read position over a fixed byte region.
///
/// Reads are checked against `limit`, not against the end of the region, so a nested
/// length-delimited range can narrow the limit (see [`ByteCursor::push_limit`]) and be decoded
/// in place without any risk of reading into sibling data.
///
/// Every read is atomic: on success the position advances by exactly the bytes consumed, on
/// failure it is left where it was.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    region: &'a [u8],
    position: usize,
    limit: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `region`, limited to its full length.
    pub fn new(region: &'a [u8]) -> Self {
        Self {
            region,
            position: 0,
            limit: region.len(),
        }
    }

    /// Create a cursor starting at `position`. The position is clamped to the region length.
    pub fn with_position(region: &'a [u8], position: usize) -> Self {
        Self {
            region,
            position: position.min(region.len()),
            limit: region.len(),
        }
    }

    /// The underlying byte region.
    pub fn region(&self) -> &'a [u8] {
        self.region
    }

    /// Current read offset into the region.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Exclusive upper bound for reads.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes left before the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn is_at_limit(&self) -> bool {
        self.position >= self.limit
    }

    /// Narrow the limit to the next `len` bytes and return the previous limit.
    ///
    /// Fails with [`DecodeError::Truncated`] if the new range would extend past the current limit.
    pub fn push_limit(&mut self, len: usize) -> Result<usize> {
        let end = self.checked_end(len)?;
        let old = self.limit;
        self.limit = end;
        Ok(old)
    }

    /// Restore a limit returned by [`ByteCursor::push_limit`].
    pub fn pop_limit(&mut self, old: usize) {
        debug_assert!(old >= self.limit && old <= self.region.len());
        self.limit = old;
    }

    /// Bytes between the position and the limit, without advancing.
    fn window(&self) -> &'a [u8] {
        &self.region[self.position..self.limit]
    }

    fn checked_end(&self, needed: usize) -> Result<usize> {
        match self.position.checked_add(needed) {
            Some(end) if end <= self.limit => Ok(end),
            _ => Err(self.truncated(needed)),
        }
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            offset: self.position,
            needed,
            limit: self.limit,
        }
    }

    fn varint_error(&self, err: VarintError) -> DecodeError {
        let error = match err {
            VarintError::Truncated => self.truncated(self.remaining() + 1),
            VarintError::TooLong => DecodeError::VarintTooLong {
                offset: self.position,
            },
        };
        debug!(position = self.position, ?error, "varint read failed");
        error
    }

    /// Consume exactly `N` bytes.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.checked_end(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(&self.region[self.position..end]);
        self.position = end;
        Ok(arr)
    }

    /// Read a varint into a 32-bit accumulator and reinterpret it as signed.
    ///
    /// Groups past the fifth are consumed but do not affect the value. A varint that reaches the
    /// limit without terminating is [`DecodeError::Truncated`], however long the run; one that
    /// terminates only after ten bytes is [`DecodeError::VarintTooLong`].
    pub fn read_varint32(&mut self) -> Result<i32> {
        self.read_uint32().map(|v| v as i32)
    }

    /// Read a varint into a 32-bit accumulator.
    pub fn read_uint32(&mut self) -> Result<u32> {
        let (value, len) = varint::decode_varint32(self.window()).map_err(|e| self.varint_error(e))?;
        self.position += len;
        Ok(value)
    }

    /// Read a zig-zag encoded `sint32`.
    pub fn read_varint32_zigzag(&mut self) -> Result<i32> {
        self.read_uint32().map(varint::decode_zigzag32)
    }

    /// Read a full 64-bit varint.
    pub fn read_varint64(&mut self) -> Result<u64> {
        let (value, len) = varint::decode_varint(self.window()).map_err(|e| self.varint_error(e))?;
        self.position += len;
        Ok(value)
    }

    /// Read a zig-zag encoded `sint64`.
    pub fn read_varint64_zigzag(&mut self) -> Result<i64> {
        self.read_varint64().map(varint::decode_zigzag64)
    }

    /// Read a `bool`; any non-zero varint is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_varint64().map(|v| v != 0)
    }

    /// Read a field tag.
    pub fn read_tag(&mut self) -> Result<Tag> {
        self.read_uint32().map(Tag::from_raw)
    }

    pub fn read_fixed32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_sfixed32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_fixed64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_sfixed64(&mut self) -> Result<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    pub fn read_float32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    pub fn read_float64(&mut self) -> Result<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    /// Read a varint length followed by that many bytes.
    ///
    /// The returned slice borrows from the region; nothing is copied.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let start = self.position;
        let len = self.read_uint32()? as usize;
        let end = match self.checked_end(len) {
            Ok(end) => end,
            Err(err) => {
                self.position = start;
                return Err(err);
            }
        };
        let bytes = &self.region[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a length-delimited UTF-8 string.
    ///
    /// Invalid UTF-8 fails with [`DecodeError::InvalidEncoding`]; nothing is substituted.
    pub fn read_utf8_string(&mut self) -> Result<&'a str> {
        let start = self.position;
        let bytes = self.read_length_delimited()?;
        match simdutf8::compat::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(err) => {
                let offset = self.position - bytes.len();
                self.position = start;
                Err(DecodeError::InvalidEncoding {
                    offset,
                    valid_up_to: err.valid_up_to(),
                })
            }
        }
    }

    /// Advance `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.position = self.checked_end(n)?;
        Ok(())
    }
}
