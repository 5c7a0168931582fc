//! Client module
//!
//! Owns the transport side of the codec: a connection handle that sends
//! encoded commands and buffers socket reads until a complete reply
//! decodes. There is no ambient connection state; callers own the handle.

mod connection;

pub use connection::Connection;
