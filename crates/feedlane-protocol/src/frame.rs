//! Frame codec: length-prefixed JSON messages.
//!
//! Each frame is the ASCII literal `0x`, eight lowercase hex digits
//! giving the exact byte length of the payload, a newline, then that
//! many bytes of UTF-8 JSON. No trailing newline is counted in the
//! length, and no maximum frame size is enforced at this layer.

use std::io::{BufRead, ErrorKind, Write};

use serde_json::Value;

use crate::error::FrameError;
use crate::message::Message;

/// Serialize one message as a frame and flush so the peer observes it
/// promptly.
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, message: &Message) -> Result<(), FrameError> {
    let payload = serde_json::to_vec(&message.to_wire())?;
    writeln!(writer, "0x{:08x}", payload.len())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one complete frame and decode it as a message.
///
/// End of stream before any header byte is [`FrameError::Closed`];
/// everything else short of a well-formed message is an error that
/// aborts the session.
pub fn read_frame<R: BufRead + ?Sized>(reader: &mut R) -> Result<Message, FrameError> {
    let mut header = String::new();
    if reader.read_line(&mut header)? == 0 {
        return Err(FrameError::Closed);
    }
    let expected = parse_header(&header)?;

    let mut payload = vec![0u8; expected];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            FrameError::Truncated { expected }
        } else {
            FrameError::Io(e)
        }
    })?;

    let value: Value = serde_json::from_slice(&payload)?;
    Message::from_wire(value)
}

fn parse_header(line: &str) -> Result<usize, FrameError> {
    let malformed = || FrameError::MalformedHeader(line.trim_end().to_string());
    let digits = line
        .strip_prefix("0x")
        .and_then(|rest| rest.strip_suffix('\n'))
        .ok_or_else(malformed)?;
    // from_str_radix tolerates a leading sign; the header must be hex
    // digits only.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed());
    }
    usize::from_str_radix(digits, 16).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Ticket;
    use serde_json::json;
    use std::io::Cursor;

    fn encode(message: &Message) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, message).unwrap();
        buffer
    }

    #[test]
    fn header_is_bit_exact() {
        let message = Message::invocation(Ticket::from("5"), "echo", vec![json!("hi")]);
        let encoded = encode(&message);
        let payload = serde_json::to_vec(&message.to_wire()).unwrap();
        let expected_header = format!("0x{:08x}\n", payload.len());

        assert!(encoded.starts_with(expected_header.as_bytes()));
        assert_eq!(encoded.len(), expected_header.len() + payload.len());
        // 8 lowercase hex digits, no trailing newline after the payload
        assert_eq!(expected_header.len(), 11);
        assert_ne!(*encoded.last().unwrap(), b'\n');
    }

    #[test]
    fn round_trip() {
        let messages = vec![
            Message::invocation(Ticket::from("1"), "select", vec![json!({"interface": "i"}), json!(true)]),
            Message::reply_ok(Ticket::from("1"), json!([null, 3, "s", {"k": []}])),
            Message::reply_fail(Ticket::from("2"), "x"),
        ];
        for message in messages {
            let mut cursor = Cursor::new(encode(&message));
            assert_eq!(read_frame(&mut cursor).unwrap(), message);
        }
    }

    #[test]
    fn clean_eof_is_closed() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(matches!(read_frame(&mut cursor), Err(FrameError::Closed)));
    }

    #[test]
    fn malformed_header_rejected() {
        for input in [
            "xx00000002\n[]",
            "0xzz\n[]",
            "0x\n[]",
            "0x00000002[]",
            "0x+4\nnull",
            "0x-4\nnull",
        ] {
            let mut cursor = Cursor::new(input.as_bytes().to_vec());
            assert!(
                matches!(read_frame(&mut cursor), Err(FrameError::MalformedHeader(_))),
                "accepted header of {input:?}"
            );
        }
    }

    #[test]
    fn truncated_payload_rejected() {
        let mut encoded = encode(&Message::reply_ok(Ticket::from("1"), json!(null)));
        encoded.truncate(encoded.len() - 2);
        let mut cursor = Cursor::new(encoded);
        assert!(matches!(
            read_frame(&mut cursor),
            Err(FrameError::Truncated { .. })
        ));
    }

    #[test]
    fn invalid_json_payload_rejected() {
        let mut cursor = Cursor::new(b"0x00000003\n{{{".to_vec());
        assert!(matches!(
            read_frame(&mut cursor),
            Err(FrameError::InvalidPayload(_))
        ));
    }

    #[test]
    fn short_hex_length_accepted_on_read() {
        // Writers always emit 8 digits; readers tolerate fewer.
        let mut cursor = Cursor::new(b"0x4\nnull".to_vec());
        let err = read_frame(&mut cursor).unwrap_err();
        // "null" parses as JSON but is not a message shape
        assert!(matches!(err, FrameError::Shape(_)));
    }
}
