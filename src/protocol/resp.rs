//! RESP2 decoder and encoder
//!
//! Implements decoding from bytes to RespValue and encoding from command
//! arguments (or a RespValue) to bytes

use super::types::{DecodeError, RespValue};
use bytes::{BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// Default limit on array nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// RESP2 decoder
///
/// Decodes one complete top-level reply per call. The input buffer is
/// never mutated: a caller advances its own cursor by the consumed length
/// only after a full success, so a failed decode can always be retried on
/// the same region once more bytes arrive.
#[derive(Debug, Clone)]
pub struct RespDecoder {
    /// Nesting limit, exceeded means NestingTooDeep
    max_depth: usize,
}

impl RespDecoder {
    /// Create a decoder with the default nesting limit
    pub fn new() -> Self {
        RespDecoder {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a decoder with a custom nesting limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        RespDecoder { max_depth }
    }

    /// Decode exactly one top-level reply
    ///
    /// Returns the value and the unconsumed remainder of the buffer. A
    /// buffer holding several replies yields only the first; the caller
    /// keeps the remainder for its next call.
    ///
    /// `Err(DecodeError::TruncatedFrame)` means the buffer ends before the
    /// frame does; read more bytes and retry.
    pub fn decode_one<'a>(&self, buf: &'a [u8]) -> Result<(RespValue, &'a [u8]), DecodeError> {
        let mut pos = 0;
        let value = self.parse_value(buf, &mut pos, 0)?;
        Ok((value, &buf[pos..]))
    }

    /// Decode every complete top-level reply in the buffer
    ///
    /// The explicit batch variant of [`decode_one`](Self::decode_one).
    /// Stops at the first truncated frame and returns it as the remainder;
    /// hard errors propagate.
    pub fn decode_all<'a>(
        &self,
        buf: &'a [u8],
    ) -> Result<(Vec<RespValue>, &'a [u8]), DecodeError> {
        let mut values = Vec::new();
        let mut rest = buf;

        while !rest.is_empty() {
            match self.decode_one(rest) {
                Ok((value, remainder)) => {
                    values.push(value);
                    rest = remainder;
                }
                Err(DecodeError::TruncatedFrame) => break,
                Err(e) => return Err(e),
            }
        }

        Ok((values, rest))
    }

    /// Parse one value at `pos`, advancing `pos` past it
    fn parse_value(
        &self,
        buf: &[u8],
        pos: &mut usize,
        depth: usize,
    ) -> Result<RespValue, DecodeError> {
        if depth > self.max_depth {
            return Err(DecodeError::NestingTooDeep);
        }

        let tag = *buf.get(*pos).ok_or(DecodeError::TruncatedFrame)?;
        *pos += 1;

        match tag {
            b'+' => {
                let line = read_line(buf, pos)?;
                Ok(RespValue::SimpleString(Bytes::copy_from_slice(line)))
            }
            b'-' => {
                let line = read_line(buf, pos)?;
                Ok(RespValue::Error(Bytes::copy_from_slice(line)))
            }
            b':' => {
                let line = read_line(buf, pos)?;
                Ok(RespValue::Integer(parse_decimal(line)?))
            }
            b'$' => self.parse_bulk_string(buf, pos),
            b'*' => self.parse_array(buf, pos, depth),
            other => Err(DecodeError::UnknownType(other)),
        }
    }

    /// Parse bulk string: $6\r\nfoobar\r\n or $-1\r\n (null)
    fn parse_bulk_string(&self, buf: &[u8], pos: &mut usize) -> Result<RespValue, DecodeError> {
        let len = parse_decimal(read_line(buf, pos)?)?;

        if len == -1 {
            return Ok(RespValue::BulkString(None));
        }
        if len < 0 {
            return Err(DecodeError::MalformedInteger);
        }

        let len = len as usize;
        if buf.len() - *pos < len + 2 {
            return Err(DecodeError::TruncatedFrame);
        }

        let payload = &buf[*pos..*pos + len];
        if &buf[*pos + len..*pos + len + 2] != CRLF {
            return Err(DecodeError::MissingTerminator);
        }
        *pos += len + 2;

        Ok(RespValue::BulkString(Some(Bytes::copy_from_slice(payload))))
    }

    /// Parse array: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n or *-1\r\n (null)
    fn parse_array(
        &self,
        buf: &[u8],
        pos: &mut usize,
        depth: usize,
    ) -> Result<RespValue, DecodeError> {
        let count = parse_decimal(read_line(buf, pos)?)?;

        if count == -1 {
            // Null array, decoded as empty per RESP convention
            return Ok(RespValue::Array(Vec::new()));
        }
        if count < 0 {
            return Err(DecodeError::MalformedInteger);
        }

        // The count comes off the wire, so cap the preallocation
        let mut elements = Vec::with_capacity((count as usize).min(64));
        for _ in 0..count {
            elements.push(self.parse_value(buf, pos, depth + 1)?);
        }

        Ok(RespValue::Array(elements))
    }
}

impl Default for RespDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read up to the next CRLF, advance `pos` past it, return the line
/// without the terminator
fn read_line<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8], DecodeError> {
    let start = *pos;

    match buf[start..].windows(2).position(|w| w == CRLF) {
        Some(offset) => {
            *pos = start + offset + 2;
            Ok(&buf[start..start + offset])
        }
        None => Err(DecodeError::TruncatedFrame),
    }
}

fn parse_decimal(line: &[u8]) -> Result<i64, DecodeError> {
    std::str::from_utf8(line)
        .map_err(|_| DecodeError::MalformedInteger)?
        .parse::<i64>()
        .map_err(|_| DecodeError::MalformedInteger)
}

/// RESP2 encoder
pub struct RespEncoder;

impl RespEncoder {
    /// Encode a command as an array of bulk strings
    ///
    /// Arguments are framed by explicit length, never by delimiter, so
    /// they may contain any bytes including CR and LF. An empty argument
    /// list encodes as *0\r\n.
    pub fn encode_command<A: AsRef<[u8]>>(args: &[A]) -> Bytes {
        let mut buf = BytesMut::new();
        Self::encode_command_to(&mut buf, args);
        buf.freeze()
    }

    /// Encode a command into an existing buffer
    pub fn encode_command_to<A: AsRef<[u8]>>(buf: &mut BytesMut, args: &[A]) {
        buf.put_u8(b'*');
        buf.put_slice(args.len().to_string().as_bytes());
        buf.put_slice(CRLF);

        for arg in args {
            let arg = arg.as_ref();
            buf.put_u8(b'$');
            buf.put_slice(arg.len().to_string().as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(arg);
            buf.put_slice(CRLF);
        }
    }

    /// Encode a RESP value to bytes
    pub fn encode_value(value: &RespValue) -> Bytes {
        let mut buf = BytesMut::new();
        Self::encode_value_to(&mut buf, value);
        buf.freeze()
    }

    /// Encode a RESP value into an existing buffer
    pub fn encode_value_to(buf: &mut BytesMut, value: &RespValue) {
        match value {
            RespValue::SimpleString(s) => {
                buf.put_u8(b'+');
                buf.put_slice(s);
                buf.put_slice(CRLF);
            }
            RespValue::Error(e) => {
                buf.put_u8(b'-');
                buf.put_slice(e);
                buf.put_slice(CRLF);
            }
            RespValue::Integer(i) => {
                buf.put_u8(b':');
                buf.put_slice(i.to_string().as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::BulkString(Some(bytes)) => {
                buf.put_u8(b'$');
                buf.put_slice(bytes.len().to_string().as_bytes());
                buf.put_slice(CRLF);
                buf.put_slice(bytes);
                buf.put_slice(CRLF);
            }
            RespValue::BulkString(None) => {
                buf.put_slice(b"$-1\r\n");
            }
            RespValue::Array(arr) => {
                buf.put_u8(b'*');
                buf.put_slice(arr.len().to_string().as_bytes());
                buf.put_slice(CRLF);
                for elem in arr {
                    Self::encode_value_to(buf, elem);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(buf: &[u8]) -> Result<(RespValue, &[u8]), DecodeError> {
        RespDecoder::new().decode_one(buf)
    }

    #[test]
    fn test_decode_simple_string() {
        let (value, rest) = decode(b"+OK\r\n").unwrap();
        assert_eq!(value, RespValue::simple_string("OK"));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_error_as_data() {
        // A server error is a decoded value, never a codec failure
        let (value, rest) = decode(b"-ERR unknown command\r\n").unwrap();
        assert_eq!(value, RespValue::error("ERR unknown command"));
        assert!(value.is_error());
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_integer() {
        let (value, _) = decode(b":1000\r\n").unwrap();
        assert_eq!(value, RespValue::Integer(1000));

        let (value, _) = decode(b":-5\r\n").unwrap();
        assert_eq!(value, RespValue::Integer(-5));

        let (value, _) = decode(b":0\r\n").unwrap();
        assert_eq!(value, RespValue::Integer(0));
        assert_eq!(value.as_integer(), Some(0));
    }

    #[test]
    fn test_decode_bulk_string() {
        let (value, rest) = decode(b"$6\r\nfoobar\r\n").unwrap();
        assert_eq!(value, RespValue::bulk_string("foobar"));
        assert_eq!(value.as_bulk_string(), Some(&Bytes::from("foobar")));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_null_and_empty_bulk_are_distinct() {
        let (null, _) = decode(b"$-1\r\n").unwrap();
        let (empty, _) = decode(b"$0\r\n\r\n").unwrap();

        assert_eq!(null, RespValue::BulkString(None));
        assert_eq!(empty, RespValue::BulkString(Some(Bytes::new())));
        assert_ne!(null, empty);
        assert!(null.is_null());
        assert!(!empty.is_null());
    }

    #[test]
    fn test_decode_empty_array() {
        let (value, rest) = decode(b"*0\r\n").unwrap();
        assert_eq!(value, RespValue::Array(vec![]));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_null_array() {
        let (value, rest) = decode(b"*-1\r\n").unwrap();
        assert_eq!(value, RespValue::Array(vec![]));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_nested_array() {
        let (value, rest) = decode(b"*2\r\n:1\r\n*1\r\n+ok\r\n").unwrap();
        assert_eq!(
            value,
            RespValue::array(vec![
                RespValue::integer(1),
                RespValue::array(vec![RespValue::simple_string("ok")]),
            ])
        );
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_command_shaped_array() {
        let (value, _) = decode(b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n").unwrap();
        assert_eq!(
            value,
            RespValue::array(vec![
                RespValue::bulk_string("foo"),
                RespValue::bulk_string("bar"),
            ])
        );
    }

    #[test]
    fn test_truncated_bulk_string() {
        assert_eq!(decode(b"$5\r\nhel"), Err(DecodeError::TruncatedFrame));
    }

    #[test]
    fn test_truncated_line() {
        assert_eq!(decode(b"+PON"), Err(DecodeError::TruncatedFrame));
        assert_eq!(decode(b""), Err(DecodeError::TruncatedFrame));
        assert_eq!(decode(b"*2\r\n:1\r\n"), Err(DecodeError::TruncatedFrame));
    }

    #[test]
    fn test_truncation_is_recoverable() {
        let err = decode(b"$5\r\nhel").unwrap_err();
        assert!(err.is_recoverable());

        let err = decode(b"?xyz\r\n").unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(decode(b"?xyz\r\n"), Err(DecodeError::UnknownType(b'?')));
    }

    #[test]
    fn test_malformed_integer() {
        assert_eq!(decode(b":abc\r\n"), Err(DecodeError::MalformedInteger));
        assert_eq!(decode(b":\r\n"), Err(DecodeError::MalformedInteger));
        assert_eq!(decode(b"$x\r\n"), Err(DecodeError::MalformedInteger));
        assert_eq!(decode(b"*-2\r\n"), Err(DecodeError::MalformedInteger));
        assert_eq!(decode(b"$-2\r\n"), Err(DecodeError::MalformedInteger));
    }

    #[test]
    fn test_missing_terminator() {
        assert_eq!(
            decode(b"$6\r\nfoobarXY"),
            Err(DecodeError::MissingTerminator)
        );
    }

    #[test]
    fn test_single_frame_leaves_remainder() {
        let (value, rest) = decode(b"+PONG\r\n+PONG\r\n").unwrap();
        assert_eq!(value, RespValue::simple_string("PONG"));
        assert_eq!(rest, b"+PONG\r\n");
    }

    #[test]
    fn test_decode_all_stops_at_truncation() {
        let decoder = RespDecoder::new();
        let (values, rest) = decoder.decode_all(b"+PONG\r\n:1\r\n$3\r\nab").unwrap();
        assert_eq!(
            values,
            vec![RespValue::simple_string("PONG"), RespValue::integer(1)]
        );
        assert_eq!(rest, b"$3\r\nab");
    }

    #[test]
    fn test_decode_all_propagates_hard_errors() {
        let decoder = RespDecoder::new();
        assert_eq!(
            decoder.decode_all(b"+OK\r\n?x\r\n"),
            Err(DecodeError::UnknownType(b'?'))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut input = b"*1\r\n".repeat(70);
        input.extend_from_slice(b":1\r\n");

        assert_eq!(
            RespDecoder::new().decode_one(&input),
            Err(DecodeError::NestingTooDeep)
        );

        let (value, rest) = RespDecoder::with_max_depth(128).decode_one(&input).unwrap();
        assert!(rest.is_empty());

        let mut depth = 0;
        let mut current = &value;
        while let RespValue::Array(arr) = current {
            depth += 1;
            current = &arr[0];
        }
        assert_eq!(depth, 70);
        assert_eq!(*current, RespValue::Integer(1));
    }

    #[test]
    fn test_encode_command() {
        let encoded = RespEncoder::encode_command(&["SET", "key", "value"]);
        assert_eq!(&encoded[..], b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n");
    }

    #[test]
    fn test_encode_empty_command() {
        let args: [&[u8]; 0] = [];
        assert_eq!(&RespEncoder::encode_command(&args)[..], b"*0\r\n");
    }

    #[test]
    fn test_encode_command_is_binary_safe() {
        let args: [&[u8]; 2] = [b"SET", b"a\r\nb"];
        let encoded = RespEncoder::encode_command(&args);
        assert_eq!(&encoded[..], b"*2\r\n$3\r\nSET\r\n$4\r\na\r\nb\r\n");

        let (value, rest) = decode(&encoded).unwrap();
        assert_eq!(
            value.as_array().unwrap()[1],
            RespValue::bulk_string(&b"a\r\nb"[..])
        );
        assert!(rest.is_empty());
    }

    #[test]
    fn test_command_round_trip() {
        let args = ["LPUSH", "mylist", "one", "two"];
        let encoded = RespEncoder::encode_command(&args);

        let (value, rest) = decode(&encoded).unwrap();
        assert!(rest.is_empty());

        let expected: Vec<RespValue> = args
            .iter()
            .map(|a| RespValue::bulk_string(a.to_string()))
            .collect();
        assert_eq!(value, RespValue::Array(expected));
    }

    #[test]
    fn test_encode_value() {
        assert_eq!(
            &RespEncoder::encode_value(&RespValue::simple_string("OK"))[..],
            b"+OK\r\n"
        );
        assert_eq!(
            &RespEncoder::encode_value(&RespValue::error("ERR oops"))[..],
            b"-ERR oops\r\n"
        );
        assert_eq!(
            &RespEncoder::encode_value(&RespValue::integer(-42))[..],
            b":-42\r\n"
        );
        assert_eq!(&RespEncoder::encode_value(&RespValue::null())[..], b"$-1\r\n");
    }

    #[test]
    fn test_value_round_trip() {
        let value = RespValue::array(vec![
            RespValue::bulk_string("foo"),
            RespValue::null(),
            RespValue::array(vec![RespValue::integer(7)]),
        ]);

        let encoded = RespEncoder::encode_value(&value);
        let (decoded, rest) = decode(&encoded).unwrap();
        assert_eq!(decoded, value);
        assert!(rest.is_empty());
    }
}
