//! FerrumWire - RESP2 wire codec and interactive client
//!
//! FerrumWire is split along a single seam:
//! - The protocol module is pure computation over in-memory byte buffers
//! - The client module owns the transport around it (socket, read buffer)
//!
//! The codec holds no process-wide state and is safe to use from any
//! number of threads on independent buffers.

pub mod client;
pub mod protocol;

/// Re-export commonly used types
pub use client::Connection;
pub use protocol::{DecodeError, RespDecoder, RespEncoder, RespValue, DEFAULT_MAX_DEPTH};
