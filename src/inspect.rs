//! Schema-less payload inspection.
//!
//! Renders an arbitrary protobuf payload as JSON keyed by field number. Useful for looking at a
//! payload that a message type refuses to decode.

use std::ops::Range;

use base64::prelude::*;
use serde_json::{Map, Value, json};

use crate::cursor::ByteCursor;
use crate::decoder::{DecoderConfig, MessageDecoder};
use crate::error::Result;
use crate::message::{FieldOutcome, FieldVisitor};
use crate::wire::{Tag, WireType};

const RESERVED_FIELD_NUMBER: Range<u32> = 19000..20000;

/// Converts protobuf payloads to JSON without a schema.
///
/// Length-delimited values are guessed: a nested message if they decode cleanly, otherwise text
/// or bytes. Groups are skipped. Values nested deeper than [`DecoderConfig::max_message_depth`]
/// are never guessed to be messages and come out as bytes.
#[derive(Debug, Default, Clone)]
pub struct Inspector {
    /// How to encode bytes fields when converting to JSON.
    pub bytes_encoding: BytesEncoding,

    /// Settings for the underlying decoder.
    pub config: DecoderConfig,
}

impl Inspector {
    /// Create a new inspector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new inspector with the given bytes encoding method.
    pub fn with_bytes_encoding(bytes_encoding: BytesEncoding) -> Self {
        Self {
            bytes_encoding,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Convert a payload to JSON.
    ///
    /// Unlike nested values, the top level is never guessed: malformed input is an error.
    pub fn inspect(&self, data: &[u8]) -> Result<Value> {
        let mut fields = JsonFields::new(self, 0);
        MessageDecoder::with_config(self.config).decode_slice(&mut fields, data)?;
        Ok(Value::Object(fields.map))
    }

    /// Try to read a length-delimited value found `depth` messages below the top level as a
    /// nested message.
    fn nested(&self, data: &[u8], depth: usize) -> Option<Value> {
        if data.is_empty() || depth > self.config.max_message_depth {
            return None;
        }

        // Printable text is much more likely than a message that happens to look like text.
        let utf8_str = simdutf8::basic::from_utf8(data);
        if utf8_str.is_ok_and(|s| s.chars().all(|c| !c.is_control())) {
            return None;
        }

        let mut fields = JsonFields::new(self, depth);
        MessageDecoder::with_config(self.config)
            .decode_slice(&mut fields, data)
            .ok()?;
        if fields.map.is_empty() || (utf8_str.is_ok() && fields.reserved) {
            return None;
        }
        Some(Value::Object(fields.map))
    }

    fn bytes(&self, bytes: &[u8], depth: usize) -> Value {
        if let Some(nested) = self.nested(bytes, depth) {
            return nested;
        }
        match self.bytes_encoding {
            BytesEncoding::Auto => match simdutf8::basic::from_utf8(bytes) {
                Ok(s) => Value::String(s.to_string()),
                Err(_) => Value::String(BASE64_STANDARD.encode(bytes)),
            },
            BytesEncoding::Base64 => Value::String(BASE64_STANDARD.encode(bytes)),
            BytesEncoding::ByteArray => json!(bytes),
            #[cfg(feature = "stfu8")]
            BytesEncoding::Stfu8 => Value::String(stfu8::encode_u8(bytes)),
            BytesEncoding::StringLossy => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Collects every field of one message level into a JSON object.
struct JsonFields<'i> {
    inspector: &'i Inspector,
    map: Map<String, Value>,
    reserved: bool,
    /// Number of enclosing messages; the top level is 0.
    depth: usize,
}

impl<'i> JsonFields<'i> {
    fn new(inspector: &'i Inspector, depth: usize) -> Self {
        Self {
            inspector,
            map: Map::new(),
            reserved: false,
            depth,
        }
    }

    fn insert(&mut self, number: u32, value: Value) {
        let key = number.to_string();
        if let Some(existing) = self.map.get_mut(&key) {
            if let Value::Array(arr) = existing {
                arr.push(value);
            } else {
                let old_value = existing.take();
                *existing = Value::Array(vec![old_value, value]);
            }
        } else {
            self.map.insert(key, value);
        }
    }
}

impl FieldVisitor for JsonFields<'_> {
    fn visit_field(&mut self, tag: Tag, cursor: &mut ByteCursor<'_>) -> Result<FieldOutcome> {
        let value = match tag.wire_type() {
            WireType::Varint => Value::from(cursor.read_varint64()?),
            WireType::Fixed64 => Value::from(cursor.read_fixed64()?),
            WireType::Fixed32 => Value::from(cursor.read_fixed32()?),
            WireType::LengthDelimited => {
                let data = cursor.read_length_delimited()?;
                self.inspector.bytes(data, self.depth + 1)
            }
            WireType::GroupStart | WireType::GroupEnd | WireType::Invalid(_) => {
                return Ok(FieldOutcome::Unrecognized);
            }
        };
        if RESERVED_FIELD_NUMBER.contains(&tag.field_number()) {
            self.reserved = true;
        }
        self.insert(tag.field_number(), value);
        Ok(FieldOutcome::Handled)
    }
}

/// How to encode bytes fields when converting to JSON.
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BytesEncoding {
    #[default]
    /// Encode bytes as a string if valid UTF-8, otherwise as base64.
    Auto,

    /// Encode bytes as base64 string.
    Base64,

    /// Encode bytes as a JSON array of numbers.
    ByteArray,

    #[cfg(feature = "stfu8")]
    /// Encode bytes as [stfu8](https://crates.io/crates/stfu8) encoded string.
    Stfu8,

    /// Encode bytes as a UTF-8 lossy string.
    StringLossy,
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::decoder::DEFAULT_MAX_MESSAGE_DEPTH;
    use crate::error::DecodeError;
    use crate::writer::WireWriter;

    #[test]
    fn test_inspect_1() {
        let data = hex!("0d1c0000001203596f751a024d65202b2a0a0a066162633132331200");
        let json = Inspector::new().inspect(&data).unwrap();
        let expected = json!({
            "1": 28,
            "2": "You",
            "3": "Me",
            "4": 43,
            "5": {
                "1": "abc123",
                "2": ""
            }
        });
        assert_eq!(json, expected);
    }

    #[test]
    fn test_inspect_2() {
        let data =
            hex!("0d1c0000001203596f751a024d65202b2a0a0a06616263313233120031ba32a96cc10200003801");
        let json = Inspector::new().inspect(&data).unwrap();
        let expected = json!({"1":28,"2":"You","3":"Me","4":43,"5":{"1":"abc123","2":""},"6":3029774971578u64,"7":1});
        assert_eq!(json, expected);
    }

    #[test]
    fn repeated_numbers_become_arrays() {
        let data = hex!("0801 0802 0803 1000");
        let json = Inspector::new().inspect(&data).unwrap();
        assert_eq!(json, json!({"1": [1, 2, 3], "2": 0}));
    }

    #[test]
    fn groups_are_skipped() {
        let mut w = WireWriter::new();
        w.write_group_start(3)
            .write_tag(1, WireType::Varint)
            .write_varint32(5)
            .write_group_end(3)
            .write_tag(4, WireType::Varint)
            .write_varint32(9);
        let json = Inspector::new().inspect(w.as_bytes()).unwrap();
        assert_eq!(json, json!({"4": 9}));
    }

    #[test]
    fn bytes_encodings() {
        let data = hex!("0a 03 ff0001");
        let json = Inspector::with_bytes_encoding(BytesEncoding::ByteArray)
            .inspect(&data)
            .unwrap();
        assert_eq!(json, json!({"1": [255, 0, 1]}));

        let json = Inspector::with_bytes_encoding(BytesEncoding::Base64)
            .inspect(&data)
            .unwrap();
        assert_eq!(json, json!({"1": "/wAB"}));

        let json = Inspector::new().inspect(&data).unwrap();
        assert_eq!(json, json!({"1": "/wAB"}));

        let json = Inspector::with_bytes_encoding(BytesEncoding::StringLossy)
            .inspect(&data)
            .unwrap();
        assert_eq!(json, json!({"1": "\u{FFFD}\u{0}\u{1}"}));
    }

    #[test]
    fn malformed_payload_reports_offset() {
        let data = hex!("0801 12 05 6869");
        let err = Inspector::new().inspect(&data).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: 4,
                needed: 5,
                limit: 6
            }
        );
    }

    /// `levels` copies of field 1 wrapped around each other, innermost `08 01`.
    fn deeply_nested(levels: usize) -> Vec<u8> {
        let mut lens = Vec::with_capacity(levels);
        let mut len = 2u64;
        for _ in 0..levels {
            lens.push(len);
            len += 1 + crate::varint::encoded_len_varint(len) as u64;
        }

        let mut data = Vec::with_capacity(len as usize);
        for &len in lens.iter().rev() {
            data.push(0x0a);
            crate::varint::encode_varint(len, &mut data);
        }
        data.extend_from_slice(&hex!("08 01"));
        data
    }

    #[test]
    fn deep_nesting_stops_guessing() {
        let data = deeply_nested(20_000);
        let json = Inspector::new().inspect(&data).unwrap();

        let mut objects = 0;
        let mut value = &json;
        while let Value::Object(map) = value {
            objects += 1;
            value = &map["1"];
        }
        assert_eq!(objects, 1 + DEFAULT_MAX_MESSAGE_DEPTH);
        assert!(value.is_string(), "{value}");
    }

    #[test]
    fn message_depth_is_configurable() {
        let data = hex!("0a 04 0a 02 1005");
        let json = Inspector::new().inspect(&data).unwrap();
        assert_eq!(json, json!({"1": {"1": {"2": 5}}}));

        let shallow = Inspector::new().with_config(DecoderConfig::new().with_max_message_depth(1));
        let json = shallow.inspect(&data).unwrap();
        assert_eq!(json, json!({"1": {"1": "\u{10}\u{5}"}}));
    }

    #[test]
    fn empty_payload_is_empty_object() {
        assert_eq!(Inspector::new().inspect(&[]).unwrap(), json!({}));
    }
}
