//! Decode errors.

/// Errors produced while reading the protobuf wire format.
///
/// Every variant carries the byte offsets needed to locate the problem in the
/// original payload. A decode call that returns an error has no partial result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A read needed more bytes than remain before the cursor limit.
    #[error("truncated input at offset {offset}: needed {needed} byte(s), limit is {limit}")]
    Truncated {
        offset: usize,
        needed: usize,
        limit: usize,
    },

    /// A length-delimited message or packed run consumed a different number of
    /// bytes than its length prefix declared.
    #[error(
        "malformed length for range starting at offset {start}: declared {declared} byte(s), consumed {actual}"
    )]
    MalformedLength {
        start: usize,
        declared: usize,
        actual: usize,
    },

    /// The low three bits of a tag do not name a wire type that can be skipped.
    #[error("unknown wire type {wire_type} at offset {offset}")]
    UnknownWireType { wire_type: u8, offset: usize },

    /// A string field was not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset} (valid up to byte {valid_up_to})")]
    InvalidEncoding { offset: usize, valid_up_to: usize },

    /// The message type does not provide the requested capability.
    #[error("{operation} is not supported by this message type")]
    UnsupportedOperation { operation: &'static str },

    /// A varint terminated only after more than 10 bytes.
    #[error("varint at offset {offset} exceeds 10 bytes")]
    VarintTooLong { offset: usize },

    /// A group was closed with an end tag for a different field number.
    #[error("group for field {expected} closed by end tag for field {found} at offset {offset}")]
    UnbalancedGroup {
        expected: u32,
        found: u32,
        offset: usize,
    },

    /// Groups were nested deeper than the configured limit.
    #[error("group nesting exceeds the limit of {limit}")]
    RecursionLimitExceeded { limit: usize },

    /// The payload is larger than the configured maximum message length.
    #[error("message of {len} bytes exceeds the maximum of {max}")]
    MessageTooLarge { len: usize, max: usize },

    /// Decoding finished but required fields were never set.
    #[error("message is missing required fields")]
    MissingRequiredFields,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecodeError>;
