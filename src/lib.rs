//! # protobuf-cursor
//!
//! A decoder for the protobuf binary wire format, driven by per-tag callbacks
//!
//! ## Features
//! * No schema or code generation: a message type decodes itself by implementing [`FieldVisitor`]
//! * Zero-copy [`ByteCursor`] with bounds-checked reads for every wire encoding
//! * Unknown fields and (nested) groups are skipped transparently
//! * Packed repeated scalars are unpacked by the decoder, one callback per element
//! * Length mismatches are reported with offsets instead of being tolerated
//! * Schema-less [`Inspector`] that renders any payload as JSON for debugging
//!
//! ## Examples
//!
//! ``` rust
//! use hex_literal::hex;
//! use protobuf_cursor::{ByteCursor, FieldOutcome, FieldVisitor, Message, Result, Tag, WireType};
//!
//! #[derive(Default)]
//! struct Point {
//!     label: String,
//!     coords: Vec<i32>,
//! }
//!
//! impl FieldVisitor for Point {
//!     fn visit_field(&mut self, tag: Tag, cursor: &mut ByteCursor<'_>) -> Result<FieldOutcome> {
//!         match (tag.field_number(), tag.wire_type()) {
//!             (1, WireType::LengthDelimited) => self.label = cursor.read_utf8_string()?.to_owned(),
//!             (2, WireType::LengthDelimited) => {
//!                 return Ok(FieldOutcome::Packed(Tag::new(2, WireType::Varint.bits())));
//!             }
//!             (2, WireType::Varint) => self.coords.push(cursor.read_varint32_zigzag()?),
//!             _ => return Ok(FieldOutcome::Unrecognized),
//!         }
//!         Ok(FieldOutcome::Handled)
//!     }
//! }
//!
//! impl Message for Point {
//!     fn reset(&mut self) {
//!         *self = Self::default();
//!     }
//!
//!     fn field_visitor(&mut self) -> Option<&mut dyn FieldVisitor> {
//!         Some(self)
//!     }
//! }
//!
//! // label = "A", coords = [3, -4] (packed sint32), plus an unknown field 9.
//! let data = hex!("0a0141 12020607 4801");
//! let mut point = Point::default();
//! point.decode_from(&data).unwrap();
//! assert_eq!(point.label, "A");
//! assert_eq!(point.coords, [3, -4]);
//! ```
//!

mod cursor;
mod decoder;
mod error;
mod inspect;
mod message;
mod varint;
mod wire;
mod writer;

pub use cursor::ByteCursor;
pub use decoder::{
    DEFAULT_MAX_GROUP_DEPTH, DEFAULT_MAX_MESSAGE_DEPTH, DecoderConfig, MessageDecoder,
};
pub use error::{DecodeError, Result};
pub use inspect::{BytesEncoding, Inspector};
pub use message::{FieldOutcome, FieldVisitor, Message};
pub use varint::{
    MAX_VARINT_LEN, VarintError, decode_varint, decode_varint32, decode_zigzag32, decode_zigzag64,
    encode_varint, encode_zigzag32, encode_zigzag64, encoded_len_varint,
};
pub use wire::{Tag, WireType};
pub use writer::WireWriter;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use {debug, trace};
