//! The contract between message types and the decoder.

use crate::cursor::ByteCursor;
use crate::decoder::MessageDecoder;
use crate::error::{DecodeError, Result};
use crate::wire::Tag;
use crate::writer::WireWriter;

/// What a [`FieldVisitor`] did with a field.
#[derive(Debug, PartialEq, Clone, Eq, Copy, Hash)]
pub enum FieldOutcome {
    /// The visitor read exactly the bytes of the value.
    Handled,

    /// The visitor does not know this tag and consumed nothing. The decoder skips the value
    /// according to its wire type.
    Unrecognized,

    /// The tag is the packed encoding of a repeated scalar field. The visitor consumed nothing;
    /// the decoder reads the run length and calls the visitor once per element with the given
    /// element tag.
    Packed(Tag),
}

/// Per-tag field interpretation, supplied by each message type.
pub trait FieldVisitor {
    /// Interpret the value that follows `tag`.
    ///
    /// On [`FieldOutcome::Handled`] the cursor must sit right after the value. On the other
    /// outcomes it must not have moved.
    fn visit_field(&mut self, tag: Tag, cursor: &mut ByteCursor<'_>) -> Result<FieldOutcome>;
}

impl<V: FieldVisitor + ?Sized> FieldVisitor for &mut V {
    fn visit_field(&mut self, tag: Tag, cursor: &mut ByteCursor<'_>) -> Result<FieldOutcome> {
        (**self).visit_field(tag, cursor)
    }
}

/// A message type that can be reset and, optionally, decoded or encoded.
///
/// Decoding and encoding are capabilities. A type that cannot decode returns `None` from
/// [`Message::field_visitor`], which callers can check up front; the decoder reports
/// [`DecodeError::UnsupportedOperation`] if asked anyway.
pub trait Message {
    /// Restore every field to its default value.
    fn reset(&mut self);

    /// Whether all required fields are set.
    fn is_initialized(&self) -> bool {
        true
    }

    /// The visitor that decodes this type's fields, if it has one.
    fn field_visitor(&mut self) -> Option<&mut dyn FieldVisitor> {
        None
    }

    /// Append this message's encoding to `writer`.
    fn encode(&self, _writer: &mut WireWriter) -> Result<()> {
        Err(DecodeError::UnsupportedOperation {
            operation: "encoding",
        })
    }

    /// Reset this message and decode it from `data` with the default decoder settings.
    fn decode_from(&mut self, data: &[u8]) -> Result<()>
    where
        Self: Sized,
    {
        MessageDecoder::new().decode_message(self, data)
    }
}
