//! RESP2 value and error types
//!
//! Defines the reply value union and the decode error taxonomy

use bytes::Bytes;
use std::fmt;

/// RESP2 reply value
///
/// One decoded protocol unit. Every variant other than `Array` is a leaf;
/// an `Array` owns its children outright.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple strings: +OK\r\n
    SimpleString(Bytes),

    /// Errors: -ERR message\r\n
    ///
    /// A server-reported error is ordinary reply data, not a decode
    /// failure.
    Error(Bytes),

    /// Integers: :1000\r\n
    Integer(i64),

    /// Bulk strings: $6\r\nfoobar\r\n
    ///
    /// `None` is the null bulk string ($-1\r\n), distinct from an empty
    /// string ($0\r\n\r\n).
    BulkString(Option<Bytes>),

    /// Arrays: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Create a simple string
    pub fn simple_string(s: impl Into<Bytes>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Create an error
    pub fn error(s: impl Into<Bytes>) -> Self {
        RespValue::Error(s.into())
    }

    /// Create an integer
    pub fn integer(i: i64) -> Self {
        RespValue::Integer(i)
    }

    /// Create a bulk string from bytes
    pub fn bulk_string(b: impl Into<Bytes>) -> Self {
        RespValue::BulkString(Some(b.into()))
    }

    /// Create the null bulk string
    pub fn null() -> Self {
        RespValue::BulkString(None)
    }

    /// Create an array
    pub fn array(v: Vec<RespValue>) -> Self {
        RespValue::Array(v)
    }

    /// Try to extract array elements
    pub fn as_array(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to extract bulk string bytes (None for the null bulk string)
    pub fn as_bulk_string(&self) -> Option<&Bytes> {
        match self {
            RespValue::BulkString(Some(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Try to extract integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Check if this is the null bulk string
    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::BulkString(None))
    }

    /// Check if this is a server error reply
    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "{}", String::from_utf8_lossy(s)),
            RespValue::Error(e) => write!(f, "(error) {}", String::from_utf8_lossy(e)),
            RespValue::Integer(i) => write!(f, "(integer) {}", i),
            RespValue::BulkString(Some(b)) => write!(f, "\"{}\"", String::from_utf8_lossy(b)),
            RespValue::BulkString(None) => write!(f, "(nil)"),
            RespValue::Array(arr) if arr.is_empty() => write!(f, "(empty array)"),
            RespValue::Array(arr) => {
                for (i, elem) in arr.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {}", i + 1, elem)?;
                }
                Ok(())
            }
        }
    }
}

/// RESP decoding errors
///
/// Only `TruncatedFrame` is recoverable: the caller should read more bytes
/// and retry from the same unconsumed region. Every other variant is
/// terminal for the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The buffer ends before the current frame does
    TruncatedFrame,

    /// An integer payload or a length field is not a signed decimal
    MalformedInteger,

    /// The leading byte is not one of the five RESP type tags
    UnknownType(u8),

    /// Array nesting exceeded the configured limit
    NestingTooDeep,

    /// A bulk string payload is not followed by CRLF
    MissingTerminator,
}

impl DecodeError {
    /// True when more input can turn this failure into a success
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecodeError::TruncatedFrame)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TruncatedFrame => write!(f, "incomplete frame, need more bytes"),
            DecodeError::MalformedInteger => write!(f, "malformed integer"),
            DecodeError::UnknownType(b) => write!(f, "unknown type prefix: 0x{:02x}", b),
            DecodeError::NestingTooDeep => write!(f, "array nesting too deep"),
            DecodeError::MissingTerminator => write!(f, "missing CRLF after bulk string data"),
        }
    }
}

impl std::error::Error for DecodeError {}
