//! Tag dispatch loop, unknown field skipping and packed field unpacking.

use crate::cursor::ByteCursor;
use crate::error::{DecodeError, Result};
use crate::message::{FieldOutcome, FieldVisitor, Message};
use crate::wire::{Tag, WireType};
use crate::{debug, trace};

/// Default bound on nested groups, matching the recursion limit used by common protobuf runtimes.
pub const DEFAULT_MAX_GROUP_DEPTH: usize = 100;

/// Default bound on how many messages deep the [`Inspector`](crate::Inspector) guesses nested
/// messages.
pub const DEFAULT_MAX_MESSAGE_DEPTH: usize = 100;

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoderConfig {
    /// How deeply unknown groups may nest before skipping gives up.
    pub max_group_depth: usize,

    /// Largest message, in bytes, the decoder will start on. `None` means unbounded.
    ///
    /// Applied to whole payloads and to every length-delimited message decoded through the
    /// decoder, not to packed runs or to byte fields read by visitors.
    pub max_message_len: Option<usize>,

    /// How many messages deep length-delimited values may still be guessed to be messages.
    ///
    /// Only schema-less inspection guesses; typed decoding recurses through visitors, which
    /// bound their own nesting.
    pub max_message_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            max_message_len: None,
            max_message_depth: DEFAULT_MAX_MESSAGE_DEPTH,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_group_depth(mut self, depth: usize) -> Self {
        self.max_group_depth = depth;
        self
    }

    pub fn with_max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = Some(len);
        self
    }

    pub fn with_max_message_depth(mut self, depth: usize) -> Self {
        self.max_message_depth = depth;
        self
    }
}

/// Drives a [`FieldVisitor`] over an encoded message.
///
/// The decoder owns no message state. It reads tags, hands each one to the visitor, and takes
/// care of the parts of the format a message type should never have to know about: skipping
/// unknown fields and groups, and unpacking packed repeated scalars.
#[derive(Debug, Default, Clone)]
pub struct MessageDecoder {
    pub config: DecoderConfig,
}

impl MessageDecoder {
    /// Create a decoder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode a message spanning all of `data`.
    pub fn decode_slice<V: FieldVisitor + ?Sized>(&self, visitor: &mut V, data: &[u8]) -> Result<()> {
        let mut cursor = ByteCursor::new(data);
        self.decode(visitor, &mut cursor, false)
    }

    /// Decode a message from an existing cursor.
    ///
    /// With `length_delimited` the message is prefixed by its varint length and decoding stops
    /// exactly at the end of that range, leaving the cursor on the next sibling. Otherwise the
    /// message runs up to the cursor limit.
    pub fn decode<'a, V: FieldVisitor + ?Sized>(
        &self,
        visitor: &mut V,
        cursor: &mut ByteCursor<'a>,
        length_delimited: bool,
    ) -> Result<()> {
        if length_delimited {
            let len = cursor.read_uint32()? as usize;
            self.check_message_len(len)?;
            trace!(position = cursor.position(), len, "decoding length-delimited message");
            within(cursor, len, |cursor| self.decode_fields(visitor, cursor))
        } else {
            self.check_message_len(cursor.remaining())?;
            trace!(position = cursor.position(), len = cursor.remaining(), "decoding message");
            self.decode_fields(visitor, cursor)
        }
    }

    /// Reset `message` and decode it from `data`, then check that its required fields are set.
    pub fn decode_message<M: Message + ?Sized>(&self, message: &mut M, data: &[u8]) -> Result<()> {
        message.reset();
        let visitor = message
            .field_visitor()
            .ok_or(DecodeError::UnsupportedOperation {
                operation: "decoding",
            })?;
        self.decode_slice(visitor, data)?;
        if !message.is_initialized() {
            return Err(DecodeError::MissingRequiredFields);
        }
        Ok(())
    }

    /// Merge a length-delimited embedded message from `cursor` into `message`.
    ///
    /// The message is not reset first: repeated occurrences of an embedded message field merge
    /// into one value.
    pub fn decode_embedded<M: Message + ?Sized>(
        &self,
        message: &mut M,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<()> {
        let visitor = message
            .field_visitor()
            .ok_or(DecodeError::UnsupportedOperation {
                operation: "decoding",
            })?;
        self.decode(visitor, cursor, true)?;
        if !message.is_initialized() {
            return Err(DecodeError::MissingRequiredFields);
        }
        Ok(())
    }

    fn check_message_len(&self, len: usize) -> Result<()> {
        match self.config.max_message_len {
            Some(max) if len > max => Err(DecodeError::MessageTooLarge { len, max }),
            _ => Ok(()),
        }
    }

    fn decode_fields<V: FieldVisitor + ?Sized>(
        &self,
        visitor: &mut V,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<()> {
        let end = cursor.limit();
        while cursor.position() < end {
            let tag = cursor.read_tag()?;
            match visitor.visit_field(tag, cursor)? {
                FieldOutcome::Handled => {}
                FieldOutcome::Unrecognized => {
                    trace!(%tag, position = cursor.position(), "skipping unknown field");
                    self.skip_field(tag, cursor)?;
                }
                FieldOutcome::Packed(element) => self.decode_packed(visitor, element, cursor)?,
            }
        }
        Ok(())
    }

    /// Unpack a length-delimited run of scalars, calling the visitor once per element.
    fn decode_packed<V: FieldVisitor + ?Sized>(
        &self,
        visitor: &mut V,
        element: Tag,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<()> {
        let len = cursor.read_uint32()? as usize;
        trace!(tag = %element, len, "unpacking packed field");
        within(cursor, len, |cursor| {
            while !cursor.is_at_limit() {
                let before = cursor.position();
                match visitor.visit_field(element, cursor)? {
                    FieldOutcome::Handled => {}
                    FieldOutcome::Unrecognized => self.skip_field(element, cursor)?,
                    FieldOutcome::Packed(_) => {
                        return Err(DecodeError::UnsupportedOperation {
                            operation: "packed field nested in a packed field",
                        });
                    }
                }
                if cursor.position() == before {
                    return Err(DecodeError::UnsupportedOperation {
                        operation: "packed element that consumes no bytes",
                    });
                }
            }
            Ok(())
        })
    }

    /// Skip the value that follows `tag` without interpreting it.
    ///
    /// Groups are skipped as one unit, nested groups included.
    pub fn skip_field(&self, tag: Tag, cursor: &mut ByteCursor<'_>) -> Result<()> {
        self.skip_value(tag, cursor, 0)
    }

    fn skip_value(&self, tag: Tag, cursor: &mut ByteCursor<'_>, depth: usize) -> Result<()> {
        match tag.wire_type() {
            WireType::Varint => {
                cursor.read_varint64()?;
            }
            WireType::Fixed32 => cursor.skip(4)?,
            WireType::Fixed64 => cursor.skip(8)?,
            WireType::LengthDelimited => {
                cursor.read_length_delimited()?;
            }
            WireType::GroupStart => self.skip_group(tag.field_number(), cursor, depth + 1)?,
            wire_type @ (WireType::GroupEnd | WireType::Invalid(_)) => {
                return Err(DecodeError::UnknownWireType {
                    wire_type: wire_type.bits(),
                    offset: cursor.position(),
                });
            }
        }
        Ok(())
    }

    fn skip_group(&self, field_number: u32, cursor: &mut ByteCursor<'_>, depth: usize) -> Result<()> {
        if depth > self.config.max_group_depth {
            return Err(DecodeError::RecursionLimitExceeded {
                limit: self.config.max_group_depth,
            });
        }
        loop {
            let offset = cursor.position();
            let tag = cursor.read_tag()?;
            match tag.wire_type() {
                WireType::GroupEnd if tag.field_number() == field_number => return Ok(()),
                WireType::GroupEnd => {
                    return Err(DecodeError::UnbalancedGroup {
                        expected: field_number,
                        found: tag.field_number(),
                        offset,
                    });
                }
                _ => self.skip_value(tag, cursor, depth)?,
            }
        }
    }
}

/// Run `body` with the cursor limited to the next `len` bytes, then require that it stopped
/// exactly at the end of that range.
///
/// A read that runs into the narrowed limit means the declared length was too short for the
/// content, so it is reported as [`DecodeError::MalformedLength`] rather than as truncation.
fn within<'a, T>(
    cursor: &mut ByteCursor<'a>,
    len: usize,
    body: impl FnOnce(&mut ByteCursor<'a>) -> Result<T>,
) -> Result<T> {
    let old = cursor.push_limit(len)?;
    let start = cursor.position();
    let end = cursor.limit();

    let result = body(cursor);
    let position = cursor.position();
    cursor.pop_limit(old);

    let actual = match result {
        Err(DecodeError::Truncated { offset, needed, limit }) if limit == end => {
            offset + needed - start
        }
        Err(err) => return Err(err),
        Ok(_) if position != end => position - start,
        Ok(value) => return Ok(value),
    };
    debug!(start, declared = len, actual, "range length disagrees with its contents");
    Err(DecodeError::MalformedLength {
        start,
        declared: len,
        actual,
    })
}
