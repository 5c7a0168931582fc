//! RESP2 protocol implementation
//!
//! This module handles encoding of client commands and decoding of server
//! replies in the Redis Serialization Protocol (RESP2). It is pure
//! computation over byte buffers and is completely independent from the
//! transport (loose coupling).

mod resp;
mod types;

pub use resp::{RespDecoder, RespEncoder, DEFAULT_MAX_DEPTH};
pub use types::{DecodeError, RespValue};
