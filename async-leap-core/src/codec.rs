// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! The LEAP frame codec.
//!
//! A frame is one UTF-8 JSON object terminated by CR-LF. There is no
//! length prefix and no whitespace between frames. The codec does not
//! understand message semantics.

use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use leap_types::{Error, RequestEnvelope, Response};

// Safety net against a runaway peer; real LEAP frames stay far below this.
const MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// Codec for CR-LF delimited JSON frames.
#[derive(Debug, Default)]
pub struct LeapCodec {
    // Index into the read buffer up to which the terminator scan has
    // already run, so partial reads are not rescanned from the start.
    next_index: usize,
}

impl LeapCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_crlf(haystack: &[u8]) -> Option<usize> {
    haystack.windows(2).position(|window| window == b"\r\n")
}

impl Decoder for LeapCodec {
    type Item = Response;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Response>, Error> {
        match find_crlf(&src[self.next_index..]) {
            Some(offset) => {
                let end = self.next_index + offset;
                let line = src.split_to(end);
                src.advance(2);
                self.next_index = 0;

                let text = std::str::from_utf8(&line)
                    .map_err(|e| Error::Parse(format!("frame is not valid UTF-8: {e}")))?;
                let response = serde_json::from_str(text)
                    .map_err(|e| Error::Parse(format!("frame is not valid JSON: {e}")))?;
                Ok(Some(response))
            }
            None => {
                if src.len() > MAX_FRAME_LENGTH {
                    return Err(Error::Parse(format!(
                        "frame exceeds {MAX_FRAME_LENGTH} bytes without a terminator"
                    )));
                }
                // Keep one byte of overlap in case the buffer ends in CR.
                self.next_index = src.len().saturating_sub(1);
                Ok(None)
            }
        }
    }
}

impl Encoder<RequestEnvelope> for LeapCodec {
    type Error = Error;

    fn encode(&mut self, envelope: RequestEnvelope, dst: &mut BytesMut) -> Result<(), Error> {
        let json = serde_json::to_vec(&envelope)
            .map_err(|e| Error::Parse(format!("failed to encode request: {e}")))?;
        dst.reserve(json.len() + 2);
        dst.extend_from_slice(&json);
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leap_types::CommuniqueType;

    #[test]
    fn decodes_complete_frames() {
        let mut codec = LeapCodec::new();
        let mut buffer = BytesMut::from(
            &b"{\"Header\":{\"StatusCode\":\"200 OK\"}}\r\n{\"Header\":{\"StatusCode\":\"201 Created\"}}\r\n"[..],
        );

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.header.status_code.unwrap().code, Some(200));
        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(second.header.status_code.unwrap().code, Some(201));
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn waits_for_the_terminator() {
        let mut codec = LeapCodec::new();
        let mut buffer = BytesMut::from(&b"{\"Header\":{}}"[..]);
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"\r");
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"\n");
        assert!(codec.decode(&mut buffer).unwrap().is_some());
    }

    #[test]
    fn rejects_invalid_json() {
        let mut codec = LeapCodec::new();
        let mut buffer = BytesMut::from(&b"not json\r\n"[..]);
        assert!(matches!(codec.decode(&mut buffer), Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut codec = LeapCodec::new();
        let mut buffer = BytesMut::from(&b"\"\xff\xfe\"\r\n"[..]);
        assert!(matches!(codec.decode(&mut buffer), Err(Error::Parse(_))));
    }

    #[test]
    fn encodes_one_line_per_frame() {
        let mut codec = LeapCodec::new();
        let mut buffer = BytesMut::new();
        let envelope = RequestEnvelope::new(
            CommuniqueType::ReadRequest,
            "/device",
            "tag-1",
            Some(serde_json::json!({"Text": "line one\nline two"})),
        );
        codec.encode(envelope, &mut buffer).unwrap();

        assert!(buffer.ends_with(b"\r\n"));
        // The embedded newline must be escaped, not raw.
        let without_terminator = &buffer[..buffer.len() - 2];
        assert!(!without_terminator.contains(&b'\n'));
    }
}
