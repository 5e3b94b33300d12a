//! Length-prefixed MessagePack framing for tokio I/O.
//!
//! Framing: `[4 bytes: payload length, big-endian u32][N bytes: payload]`.
//! The codec hands out raw payloads; [`decode_frame`] does the two-phase
//! decode (known message, then raw envelope for unknown types).

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::protocol::{MAX_PAYLOAD_SIZE, Message, RawEnvelope};

/// Codec error type.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("payload too large: {0} bytes (max {MAX_PAYLOAD_SIZE})")]
    PayloadTooLarge(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("MessagePack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

/// Frame-level codec — framing only, no deserialization on the read
/// side.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Length of the current frame being read, if the header has been
    /// consumed.
    pending_len: Option<usize>,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self { pending_len: None }
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let payload_len = match self.pending_len {
            Some(len) => len,
            None => {
                if src.len() < 4 {
                    return Ok(None); // Need more data for the header.
                }
                let len = src.get_u32() as usize;
                if len > MAX_PAYLOAD_SIZE {
                    return Err(CodecError::PayloadTooLarge(len));
                }
                self.pending_len = Some(len);
                len
            }
        };

        if src.len() < payload_len {
            // Reserve space for the rest to avoid repeated small
            // allocations.
            src.reserve(payload_len - src.len());
            return Ok(None);
        }

        let payload = src.split_to(payload_len);
        self.pending_len = None;
        Ok(Some(payload))
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = rmp_serde::to_vec_named(&item)?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(CodecError::PayloadTooLarge(payload.len()));
        }
        dst.reserve(4 + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

/// Result of attempting to decode a raw frame into a protocol message.
#[derive(Debug)]
pub enum DecodeResult {
    /// Successfully decoded a known message variant.
    Ok(Message),
    /// Unknown type — extracted envelope for error response echoing.
    UnknownType(RawEnvelope),
    /// Completely malformed — could not even extract `{type, id}`.
    Malformed(rmp_serde::decode::Error),
}

/// Two-phase decode of a raw frame payload.
pub fn decode_frame(payload: &[u8]) -> DecodeResult {
    match rmp_serde::from_slice::<Message>(payload) {
        Ok(msg) => DecodeResult::Ok(msg),
        Err(_) => match rmp_serde::from_slice::<RawEnvelope>(payload) {
            Ok(envelope) => DecodeResult::UnknownType(envelope),
            Err(e) => DecodeResult::Malformed(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::protocol::{PROTOCOL_VERSION, Status};

    fn encode(msg: &Message) -> BytesMut {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(msg.clone(), &mut buf).unwrap();
        buf
    }

    fn decode(buf: &mut BytesMut) -> Option<Message> {
        let mut codec = FrameCodec::new();
        let payload = codec.decode(buf).unwrap()?;
        match decode_frame(&payload) {
            DecodeResult::Ok(msg) => Some(msg),
            other => panic!("unexpected decode result {other:?}"),
        }
    }

    #[test]
    fn round_trip_all_variants() {
        let messages = vec![
            Message::Hello {
                id: 0,
                version: PROTOCOL_VERSION,
            },
            Message::HelloAck {
                id: 0,
                status: Status::Ok,
                error: None,
            },
            Message::PickDocument {
                id: 1,
                allowed_extensions: Some(vec!["pdf".into()]),
                allowed_mime_types: Some(vec!["application/pdf".into()]),
                invalid_name_symbols: Some(vec![":".into()]),
            },
            Message::ResolvePath {
                id: 2,
                uri: "content://media/external/images/media/42".into(),
            },
            Message::Response {
                id: 1,
                status: Status::Ok,
                path: Some("/data/cache/x.pdf".into()),
                error: None,
            },
            Message::Response {
                id: 3,
                status: Status::Busy,
                path: None,
                error: None,
            },
        ];

        for msg in &messages {
            let mut buf = encode(msg);
            let decoded = decode(&mut buf).unwrap();
            assert_eq!(&decoded, msg, "round-trip failed for {msg:?}");
        }
    }

    #[test]
    fn partial_header_returns_none() {
        let mut codec = FrameCodec::new();
        // Only 2 bytes of the 4-byte header.
        let mut buf = BytesMut::from(&[0u8, 0][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn partial_payload_returns_none() {
        let msg = Message::ResolvePath {
            id: 1,
            uri: "content://a/b".into(),
        };
        let mut full = encode(&msg);

        // Take only the header + half the payload.
        let half = full.len() / 2;
        let mut partial = full.split_to(half);

        let mut codec = FrameCodec::new();
        assert!(codec.decode(&mut partial).unwrap().is_none());

        // Feed the rest.
        partial.extend_from_slice(&full);
        let payload = codec.decode(&mut partial).unwrap().unwrap();
        match decode_frame(&payload) {
            DecodeResult::Ok(decoded) => assert_eq!(decoded, msg),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn multiple_frames_in_buffer() {
        let msg1 = Message::Hello {
            id: 1,
            version: PROTOCOL_VERSION,
        };
        let msg2 = Message::ResolvePath {
            id: 2,
            uri: "file:///x".into(),
        };

        let mut buf = BytesMut::new();
        let mut codec = FrameCodec::new();
        codec.encode(msg1.clone(), &mut buf).unwrap();
        codec.encode(msg2.clone(), &mut buf).unwrap();

        assert_eq!(decode(&mut buf), Some(msg1));
        assert_eq!(decode(&mut buf), Some(msg2));
    }

    #[test]
    fn payload_too_large_on_decode() {
        let mut buf = BytesMut::new();
        // A length header claiming 2 MiB.
        buf.put_u32((2 * 1024 * 1024) as u32);
        buf.extend_from_slice(&[0u8; 64]);

        let mut codec = FrameCodec::new();
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::PayloadTooLarge(_)));
    }

    #[test]
    fn frame_length_header_is_big_endian() {
        let buf = encode(&Message::Hello {
            id: 0,
            version: PROTOCOL_VERSION,
        });
        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(buf.len() - 4, len);
    }

    #[test]
    fn malformed_frame_is_reported() {
        match decode_frame(&[0xc0]) {
            DecodeResult::Malformed(_) => {}
            other => panic!("unexpected {other:?}"),
        }
    }
}
