//! Event envelope and registered payload types.

use bookflow_core::{BookSnapshot, ConnectionStatus, FeedId, Trade};
use serde::{Deserialize, Serialize};

/// Liveness ping emitted by a distribution endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Send timestamp (nanoseconds).
    pub sent_time_ns: u64,
}

/// Feed connection status surfaced across the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    /// Feed whose status changed.
    pub feed: FeedId,
    /// New status.
    pub status: ConnectionStatus,
}

/// Payload of one wire event.
///
/// Each variant carries a short string alias used on the wire instead of a
/// full type identifier; decoding an alias requires it to be registered in
/// the receiver's [`TypeRegistry`](crate::registry::TypeRegistry) first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// A committed book snapshot.
    Book(BookSnapshot),
    /// A standalone trade print.
    Trade(Trade),
    /// Endpoint liveness ping.
    Heartbeat(Heartbeat),
    /// Feed connection status change.
    SourceStatus(SourceStatus),
}

impl Payload {
    /// Returns the wire alias of this payload type.
    #[must_use]
    pub const fn alias(&self) -> &'static str {
        match self {
            Self::Book(_) => Self::BOOK_ALIAS,
            Self::Trade(_) => Self::TRADE_ALIAS,
            Self::Heartbeat(_) => Self::HEARTBEAT_ALIAS,
            Self::SourceStatus(_) => Self::SOURCE_STATUS_ALIAS,
        }
    }

    /// Alias of [`Payload::Book`].
    pub const BOOK_ALIAS: &'static str = "book";
    /// Alias of [`Payload::Trade`].
    pub const TRADE_ALIAS: &'static str = "trade";
    /// Alias of [`Payload::Heartbeat`].
    pub const HEARTBEAT_ALIAS: &'static str = "hb";
    /// Alias of [`Payload::SourceStatus`].
    pub const SOURCE_STATUS_ALIAS: &'static str = "status";
}

/// Envelope carrying one payload across the wire.
///
/// Used only at the wire boundary, never between in-process stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identity of the publishing source.
    pub source: String,
    /// Typed payload.
    pub payload: Payload,
}

impl Event {
    /// Creates an event from a source identity and payload.
    #[must_use]
    pub fn new(source: impl Into<String>, payload: Payload) -> Self {
        Self {
            source: source.into(),
            payload,
        }
    }
}
