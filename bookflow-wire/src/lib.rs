//! # Bookflow Wire
//!
//! Typed event envelope and wire codecs for snapshot distribution.
//!
//! This crate provides:
//! - [`event`] - The event envelope and registered payload types
//! - [`registry`] - Alias-to-decoder registry shared by both codecs
//! - [`binary`] - Compact tagged binary encoding with string back-references
//! - [`text`] - Human-readable JSON encoding for diagnostics
//! - [`codec`] - Encoding selection and whole-event encode/decode
//! - [`framing`] - Self-framing length-prefixed byte codec for transports
//!
//! The message boundary on the wire is determined entirely by the codec's
//! length prefix; transports never add framing of their own.

pub mod binary;
pub mod codec;
pub mod error;
pub mod event;
pub mod framing;
pub mod registry;
pub mod text;

pub use codec::{Encoding, EventCodec};
pub use error::WireError;
pub use event::{Event, Heartbeat, Payload, SourceStatus};
pub use framing::FrameCodec;
pub use registry::{PayloadDecoder, TypeRegistry};
