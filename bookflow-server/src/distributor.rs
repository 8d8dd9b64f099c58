//! Terminal consumer encoding events onto the wire.

use bookflow_book::{ConsumerError, SnapshotConsumer};
use bookflow_core::{BookId, BookSnapshot, ConnectionStatus, FeedId, UpdateId};
use bookflow_transport::PubSocket;
use bookflow_wire::{Event, EventCodec, FrameCodec, Heartbeat, Payload, SourceStatus};
use bytes::BytesMut;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::codec::Encoder;

/// Fans filtered snapshots out across the network boundary.
///
/// Sits at the end of the filter chain: every snapshot it receives has
/// already been synchronized and validated, so it is wrapped into an
/// event, encoded, framed, and pushed to every connected subscriber.
/// Boundary signals carry no extra information on the wire; a snapshot
/// frame is self-contained.
pub struct WireDistributor {
    source: String,
    codec: EventCodec,
    framing: Mutex<FrameCodec>,
    socket: Arc<PubSocket>,
}

impl WireDistributor {
    /// Creates a distributor publishing under the given source identity.
    #[must_use]
    pub fn new(source: impl Into<String>, codec: EventCodec, socket: Arc<PubSocket>) -> Self {
        Self {
            source: source.into(),
            codec,
            framing: Mutex::new(FrameCodec::new()),
            socket,
        }
    }

    /// Returns the source identity stamped on outgoing events.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn send(&self, payload: Payload) -> Result<(), ConsumerError> {
        let event = Event::new(self.source.clone(), payload);
        let body = self
            .codec
            .encode(&event)
            .map_err(|e| ConsumerError::new(e.to_string()))?;

        let mut framed = BytesMut::new();
        self.framing
            .lock()
            .encode(body.as_slice(), &mut framed)
            .map_err(|e| ConsumerError::new(e.to_string()))?;

        self.socket.publish(framed.freeze());
        Ok(())
    }

    /// Publishes a liveness ping to all subscribers.
    ///
    /// # Errors
    /// Returns `ConsumerError` if encoding fails.
    pub fn publish_heartbeat(&self) -> Result<(), ConsumerError> {
        let sent_time_ns = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .unsigned_abs();
        self.send(Payload::Heartbeat(Heartbeat { sent_time_ns }))
    }

    /// Publishes a feed status change to all subscribers.
    ///
    /// # Errors
    /// Returns `ConsumerError` if encoding fails.
    pub fn publish_status(
        &self,
        feed: FeedId,
        status: ConnectionStatus,
    ) -> Result<(), ConsumerError> {
        self.send(Payload::SourceStatus(SourceStatus { feed, status }))
    }
}

impl SnapshotConsumer for WireDistributor {
    fn process_new_snapshot(&self, snapshot: &BookSnapshot) -> Result<(), ConsumerError> {
        self.send(Payload::Book(snapshot.clone()))
    }

    fn process_end_update(
        &self,
        _book: &BookId,
        _update_id: UpdateId,
        _is_modified: bool,
    ) -> Result<(), ConsumerError> {
        Ok(())
    }

    fn process_no_update(&self, _update_id: UpdateId) -> Result<(), ConsumerError> {
        Ok(())
    }
}
