//! Tags and wire types.

use std::fmt;

/// Protocol buffer wire types.
#[derive(Debug, PartialEq, Clone, Eq, Copy, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Varint (0)
    Varint = 0,

    /// 64-bit (1)
    Fixed64 = 1,

    /// Length-delimited (2)
    LengthDelimited = 2,

    /// Start of a group (3)
    GroupStart = 3,

    /// End of a group (4)
    GroupEnd = 4,

    /// 32-bit (5)
    Fixed32 = 5,

    /// Invalid wire type (6 or 7)
    Invalid(u8),
}

impl WireType {
    /// The three-bit value written into a tag.
    pub fn bits(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::GroupStart => 3,
            WireType::GroupEnd => 4,
            WireType::Fixed32 => 5,
            WireType::Invalid(wt) => wt,
        }
    }
}

impl From<u8> for WireType {
    fn from(value: u8) -> Self {
        match value {
            0 => WireType::Varint,
            1 => WireType::Fixed64,
            2 => WireType::LengthDelimited,
            3 => WireType::GroupStart,
            4 => WireType::GroupEnd,
            5 => WireType::Fixed32,
            other => WireType::Invalid(other),
        }
    }
}

/// A field key as it appears on the wire: `field_number << 3 | wire_type`.
///
/// Message types usually match on `(tag.field_number(), tag.wire_type())`. A packed and an
/// unpacked encoding of the same field share a field number, so the wire type is what tells them
/// apart.
#[derive(Debug, PartialEq, Clone, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct Tag(u32);

impl Tag {
    /// Build a tag from a field number and wire type.
    pub const fn new(field_number: u32, wire_type: u8) -> Self {
        Tag((field_number << 3) | (wire_type as u32 & 0x07))
    }

    /// Wrap a raw tag value read from the wire.
    pub const fn from_raw(raw: u32) -> Self {
        Tag(raw)
    }

    /// The raw tag value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Field number (`tag >> 3`).
    pub const fn field_number(self) -> u32 {
        self.0 >> 3
    }

    /// Wire type (`tag & 0x07`).
    pub fn wire_type(self) -> WireType {
        WireType::from((self.0 & 0x07) as u8)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.field_number(), self.wire_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_wire_type_values() {
        for bits in 0..8u8 {
            assert_eq!(WireType::from(bits).bits(), bits);
        }
        assert_eq!(WireType::from(3), WireType::GroupStart);
        assert_eq!(WireType::from(4), WireType::GroupEnd);
        assert_eq!(WireType::from(6), WireType::Invalid(6));
    }

    #[test]
    fn tag_parts() {
        let tag = Tag::new(5, WireType::LengthDelimited.bits());
        assert_eq!(tag.raw(), 0x2a);
        assert_eq!(tag.field_number(), 5);
        assert_eq!(tag.wire_type(), WireType::LengthDelimited);
        assert_eq!(Tag::from_raw(0x0d).wire_type(), WireType::Fixed32);
        assert_eq!(tag.to_string(), "5:LengthDelimited");
    }

    #[test]
    fn packed_and_unpacked_differ_only_by_wire_type() {
        let unpacked = Tag::from_raw(0x08);
        let packed = Tag::from_raw(0x0a);
        assert_eq!(unpacked.field_number(), packed.field_number());
        assert_eq!(unpacked.wire_type(), WireType::Varint);
        assert_eq!(packed.wire_type(), WireType::LengthDelimited);
    }
}
