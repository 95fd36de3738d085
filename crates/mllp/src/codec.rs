use crate::MllpError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Start-of-block byte.
pub const START_BLOCK: u8 = 0x0B;
/// End-of-block byte.
pub const END_BLOCK: u8 = 0x1C;
/// Trailer byte following [`END_BLOCK`].
pub const CARRIAGE_RETURN: u8 = 0x0D;

/// Largest payload accepted by the decoder unless configured otherwise (1 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// MLLP framing for `tokio_util::codec::Framed`.
///
/// The decoder yields payloads with the framing stripped. Bytes received outside a frame
/// (before a start block) are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MllpCodec {
    max_frame_length: usize,
}

impl Default for MllpCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MllpCodec {
    pub fn new() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }

    pub fn with_max_frame_length(max_frame_length: usize) -> Self {
        Self { max_frame_length }
    }

    pub fn max_frame_length(&self) -> usize {
        self.max_frame_length
    }
}

impl Decoder for MllpCodec {
    type Item = BytesMut;
    type Error = MllpError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(start) = src.iter().position(|b| *b == START_BLOCK) else {
            src.clear();
            return Ok(None);
        };
        src.advance(start);

        let end = src[1..]
            .windows(2)
            .position(|w| w == [END_BLOCK, CARRIAGE_RETURN]);

        match end {
            Some(len) if len > self.max_frame_length => Err(MllpError::Framing(format!(
                "frame of {len} bytes exceeds maximum of {}",
                self.max_frame_length
            ))),
            Some(len) => {
                src.advance(1);
                let payload = src.split_to(len);
                src.advance(2);
                Ok(Some(payload))
            }
            // Start block plus a payload already past the limit, possibly with a
            // trailing END_BLOCK still waiting for its carriage return.
            None if src.len() > self.max_frame_length + 2 => Err(MllpError::Framing(format!(
                "frame exceeds maximum of {} bytes",
                self.max_frame_length
            ))),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None if buf.is_empty() => Ok(None),
            None => Err(MllpError::Framing(
                "connection closed in the middle of a frame".into(),
            )),
        }
    }
}

impl Encoder<Bytes> for MllpCodec {
    type Error = MllpError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item
            .iter()
            .any(|b| *b == START_BLOCK || *b == END_BLOCK)
        {
            return Err(MllpError::Framing(
                "payload contains MLLP block characters".into(),
            ));
        }

        dst.reserve(item.len() + 3);
        dst.put_u8(START_BLOCK);
        dst.extend_from_slice(&item);
        dst.put_u8(END_BLOCK);
        dst.put_u8(CARRIAGE_RETURN);
        Ok(())
    }
}
