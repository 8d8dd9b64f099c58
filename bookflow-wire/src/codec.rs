//! Encoding selection and whole-event encode/decode.

use crate::binary;
use crate::error::WireError;
use crate::event::Event;
use crate::registry::TypeRegistry;
use crate::text;
use bytes::BytesMut;
use std::sync::Arc;

/// Wire encoding for event frames.
///
/// A transport-independent configuration choice; both ends of a connection
/// must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Compact tagged binary format.
    #[default]
    Binary,
    /// Human-readable JSON, for diagnostics.
    Text,
}

/// Encodes and decodes whole events under one configured encoding.
///
/// Frame boundaries are handled separately by
/// [`FrameCodec`](crate::framing::FrameCodec); this codec works on
/// complete frame bodies.
#[derive(Clone)]
pub struct EventCodec {
    registry: Arc<TypeRegistry>,
    encoding: Encoding,
}

impl EventCodec {
    /// Creates a codec over a registry with the given encoding.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>, encoding: Encoding) -> Self {
        Self { registry, encoding }
    }

    /// Returns the configured encoding.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Returns the shared type registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Encodes an event into one frame body.
    ///
    /// # Errors
    /// Returns `WireError` if serialization fails.
    pub fn encode(&self, event: &Event) -> Result<Vec<u8>, WireError> {
        match self.encoding {
            Encoding::Binary => {
                let mut buf = BytesMut::new();
                binary::encode_event(event, &mut buf);
                Ok(buf.to_vec())
            }
            Encoding::Text => text::encode_event(event),
        }
    }

    /// Decodes one complete frame body into an event.
    ///
    /// # Errors
    /// Returns `WireError` for any structural or registry failure; the
    /// caller logs and moves on to the next frame.
    pub fn decode(&self, frame: &[u8]) -> Result<Event, WireError> {
        match self.encoding {
            Encoding::Binary => binary::decode_event(frame, &self.registry),
            Encoding::Text => text::decode_event(frame, &self.registry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Heartbeat, Payload};

    fn codec(encoding: Encoding) -> EventCodec {
        EventCodec::new(Arc::new(TypeRegistry::with_defaults()), encoding)
    }

    #[test]
    fn test_binary_round_trip() {
        let codec = codec(Encoding::Binary);
        let event = Event::new("md", Payload::Heartbeat(Heartbeat { sent_time_ns: 17 }));
        let frame = codec.encode(&event).unwrap();
        assert_eq!(codec.decode(&frame).unwrap(), event);
    }

    #[test]
    fn test_text_round_trip() {
        let codec = codec(Encoding::Text);
        let event = Event::new("md", Payload::Heartbeat(Heartbeat { sent_time_ns: 17 }));
        let frame = codec.encode(&event).unwrap();
        assert_eq!(codec.decode(&frame).unwrap(), event);
    }

    #[test]
    fn test_encodings_are_not_interchangeable_on_decode() {
        let binary = codec(Encoding::Binary);
        let text = codec(Encoding::Text);
        let event = Event::new("md", Payload::Heartbeat(Heartbeat { sent_time_ns: 17 }));

        let text_frame = text.encode(&event).unwrap();
        assert!(matches!(
            binary.decode(&text_frame).unwrap_err(),
            WireError::FormatMismatch { .. }
        ));
    }

    #[test]
    fn test_default_encoding_is_binary() {
        assert_eq!(Encoding::default(), Encoding::Binary);
    }
}
