//! Self-framing length-prefixed byte codec.
//!
//! Frame format: `[4-byte length (little-endian)][frame body]`. The length
//! prefix belongs to the codec, not the transport: transports move raw
//! bytes and a frame boundary may land anywhere inside an I/O read. A
//! partial frame leaves the buffer untouched and asks for more bytes, so
//! no frame is ever split, lost, or duplicated across reads.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Default maximum frame body size.
pub const DEFAULT_MAX_FRAME: usize = 256 * 1024;

/// Length-prefixed framing codec for event frames.
pub struct FrameCodec {
    max_frame: usize,
}

impl FrameCodec {
    /// Creates a codec with the default frame-size limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame: DEFAULT_MAX_FRAME,
        }
    }

    /// Creates a codec with a custom frame-size limit.
    #[must_use]
    pub fn with_max_frame(max_frame: usize) -> Self {
        Self { max_frame }
    }

    /// Returns the frame-size limit.
    #[must_use]
    pub const fn max_frame(&self) -> usize {
        self.max_frame
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 4 {
            return Ok(None);
        }

        let length = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if length > self.max_frame {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("frame of {length} bytes exceeds limit of {}", self.max_frame),
            ));
        }

        if src.len() < 4 + length {
            // Compact and retry: reserve the rest and wait for more bytes.
            src.reserve(4 + length - src.len());
            return Ok(None);
        }

        src.advance(4);
        Ok(Some(src.split_to(length)))
    }
}

impl<T: AsRef<[u8]>> Encoder<T> for FrameCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = item.as_ref();
        if body.len() > self.max_frame {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "frame of {} bytes exceeds limit of {}",
                    body.len(),
                    self.max_frame
                ),
            ));
        }

        dst.reserve(4 + body.len());
        dst.put_u32_le(body.len() as u32);
        dst.put_slice(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_one_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(b"snapshot".as_slice(), &mut buf).unwrap();
        assert_eq!(buf.len(), 4 + 8);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"snapshot");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_boundary_spanning_reads() {
        let mut codec = FrameCodec::new();
        let mut encoded = BytesMut::new();
        codec.encode(b"0123456789".as_slice(), &mut encoded).unwrap();

        // Feed the encoded frame one byte at a time; the decoder must
        // withhold the frame until the last byte lands, then emit it once.
        let mut buf = BytesMut::new();
        let mut frames = Vec::new();
        for byte in &encoded[..] {
            buf.put_u8(*byte);
            if let Some(frame) = codec.decode(&mut buf).unwrap() {
                frames.push(frame);
            }
        }

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"0123456789");
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(b"one".as_slice(), &mut buf).unwrap();
        codec.encode(b"two".as_slice(), &mut buf).unwrap();

        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], b"one");
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], b"two");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_oversized_inbound_frame_rejected() {
        let mut codec = FrameCodec::with_max_frame(16);
        let mut buf = BytesMut::new();
        buf.put_u32_le(64);

        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn test_oversized_outbound_frame_rejected() {
        let mut codec = FrameCodec::with_max_frame(4);
        let mut buf = BytesMut::new();
        assert!(codec.encode(b"too big".as_slice(), &mut buf).is_err());
    }

    #[test]
    fn test_empty_frame_round_trips() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(b"".as_slice(), &mut buf).unwrap();

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert!(frame.is_empty());
    }
}
