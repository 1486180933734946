//! Minimal wire format writer.
//!
//! Each method lays bytes out exactly the way the matching [`ByteCursor`](crate::ByteCursor)
//! read expects them. There is no message-level encoding here; a message type that wants to be
//! serializable drives the writer itself from [`Message::encode`](crate::Message::encode).

use crate::varint::{encode_varint, encode_zigzag32, encode_zigzag64};
use crate::wire::{Tag, WireType};

/// Growable buffer of encoded protobuf bytes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Write a field key.
    pub fn write_tag(&mut self, field_number: u32, wire_type: WireType) -> &mut Self {
        self.write_uint32(Tag::new(field_number, wire_type.bits()).raw())
    }

    /// Write an `int32`. Negative values take ten bytes, as protobuf sign-extends them to 64 bits.
    pub fn write_varint32(&mut self, value: i32) -> &mut Self {
        self.write_varint64(i64::from(value) as u64)
    }

    pub fn write_uint32(&mut self, value: u32) -> &mut Self {
        self.write_varint64(u64::from(value))
    }

    pub fn write_varint64(&mut self, value: u64) -> &mut Self {
        encode_varint(value, &mut self.buf);
        self
    }

    pub fn write_varint32_zigzag(&mut self, value: i32) -> &mut Self {
        self.write_uint32(encode_zigzag32(value))
    }

    pub fn write_varint64_zigzag(&mut self, value: i64) -> &mut Self {
        self.write_varint64(encode_zigzag64(value))
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_varint64(u64::from(value))
    }

    pub fn write_fixed32(&mut self, value: u32) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    pub fn write_sfixed32(&mut self, value: i32) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    pub fn write_fixed64(&mut self, value: u64) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    pub fn write_sfixed64(&mut self, value: i64) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    pub fn write_float32(&mut self, value: f32) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    pub fn write_float64(&mut self, value: f64) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Write a varint length prefix followed by `bytes`.
    pub fn write_length_delimited(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_varint64(bytes.len() as u64);
        self.write_raw(bytes)
    }

    pub fn write_utf8_string(&mut self, value: &str) -> &mut Self {
        self.write_length_delimited(value.as_bytes())
    }

    /// Write a length-prefixed run, such as a packed repeated field or an embedded message,
    /// whose body is produced by `body`.
    pub fn write_nested(&mut self, body: impl FnOnce(&mut WireWriter)) -> &mut Self {
        let mut inner = WireWriter::new();
        body(&mut inner);
        self.write_length_delimited(&inner.buf)
    }

    /// Write a packed repeated field: one tag, a length, then every element back to back.
    pub fn write_packed<T: Copy>(
        &mut self,
        field_number: u32,
        values: &[T],
        mut element: impl FnMut(&mut WireWriter, T),
    ) -> &mut Self {
        self.write_tag(field_number, WireType::LengthDelimited);
        self.write_nested(|w| {
            for &value in values {
                element(w, value);
            }
        })
    }

    pub fn write_group_start(&mut self, field_number: u32) -> &mut Self {
        self.write_tag(field_number, WireType::GroupStart)
    }

    pub fn write_group_end(&mut self, field_number: u32) -> &mut Self {
        self.write_tag(field_number, WireType::GroupEnd)
    }

    /// Append bytes verbatim.
    pub fn write_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn writes_teacher_fixture() {
        let mut w = WireWriter::new();
        w.write_tag(1, WireType::Fixed32)
            .write_fixed32(28)
            .write_tag(2, WireType::LengthDelimited)
            .write_utf8_string("You")
            .write_tag(3, WireType::LengthDelimited)
            .write_utf8_string("Me")
            .write_tag(4, WireType::Varint)
            .write_varint32(43)
            .write_tag(5, WireType::LengthDelimited)
            .write_nested(|m| {
                m.write_tag(1, WireType::LengthDelimited)
                    .write_utf8_string("abc123")
                    .write_tag(2, WireType::LengthDelimited)
                    .write_utf8_string("");
            });
        assert_eq!(
            w.as_bytes(),
            hex!("0d1c0000001203596f751a024d65202b2a0a0a066162633132331200")
        );
    }

    #[test]
    fn negative_int32_sign_extends() {
        let mut w = WireWriter::new();
        w.write_varint32(-1);
        assert_eq!(w.as_bytes(), hex!("ffffffffffffffffff01"));
    }

    #[test]
    fn packed_run() {
        let mut w = WireWriter::new();
        w.write_packed(4, &[1u32, 2, 3], |w, v| {
            w.write_fixed32(v);
        });
        assert_eq!(w.as_bytes(), hex!("22 0c 01000000 02000000 03000000"));
    }
}
