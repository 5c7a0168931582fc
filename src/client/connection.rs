//! Connection handling
//!
//! Manages a single client connection: encoding and sending commands,
//! reading raw bytes, and decoding complete replies out of the read
//! buffer.

use crate::protocol::{DecodeError, RespDecoder, RespEncoder, RespValue};
use anyhow::{bail, Result};
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// Client connection handle
///
/// Owns the TCP stream and the read buffer. Replies that arrive split
/// across several reads are reassembled here; replies that share one read
/// are handed out one per [`read_reply`](Self::read_reply) call.
pub struct Connection {
    /// TCP stream
    stream: TcpStream,

    /// Read buffer, holds bytes not yet decoded
    read_buffer: BytesMut,

    /// Reply decoder
    decoder: RespDecoder,
}

impl Connection {
    /// Connect to a server
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Connection::new(stream))
    }

    /// Wrap an established stream
    pub fn new(stream: TcpStream) -> Self {
        Connection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            decoder: RespDecoder::new(),
        }
    }

    /// Encode and send one command
    pub async fn send_command<A: AsRef<[u8]>>(&mut self, args: &[A]) -> Result<()> {
        let frame = RespEncoder::encode_command(args);

        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;

        debug!("Sent {} byte command frame", frame.len());
        Ok(())
    }

    /// Read exactly one reply
    ///
    /// Buffers socket reads until one complete frame decodes; bytes
    /// belonging to a following reply stay buffered for the next call.
    /// Returns Ok(None) when the server closes the connection cleanly
    /// between replies.
    pub async fn read_reply(&mut self) -> Result<Option<RespValue>> {
        loop {
            match self.decoder.decode_one(&self.read_buffer) {
                Ok((value, rest)) => {
                    let consumed = self.read_buffer.len() - rest.len();
                    self.read_buffer.advance(consumed);
                    debug!("Decoded reply: {} bytes consumed", consumed);
                    return Ok(Some(value));
                }
                Err(DecodeError::TruncatedFrame) => {
                    // Need more data
                }
                Err(e) => return Err(e.into()),
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;

            // Connection closed
            if n == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(None);
                }
                bail!("connection reset by peer");
            }

            debug!("Read {} bytes", n);
        }
    }
}
