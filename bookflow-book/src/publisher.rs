//! Change-gated snapshot fan-out.

use crate::consumer::{ConsumerError, SnapshotConsumer};
use bookflow_core::{BookId, BookSnapshot, UpdateId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Identifier of one registered consumer, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct PublisherState {
    latest: Option<BookSnapshot>,
    consumers: Vec<(SubscriptionId, Arc<dyn SnapshotConsumer>)>,
    next_id: u64,
}

/// Publish endpoint for one book side.
///
/// Holds the most recent committed snapshot and fans it out to registered
/// consumers only when the underlying book actually changed. Registration,
/// removal, and delivery iteration all hold the same lock, so the consumer
/// set is safe against concurrent publication. A failure in one consumer's
/// delivery never blocks delivery to the rest.
pub struct SnapshotPublisher {
    state: Mutex<PublisherState>,
}

impl SnapshotPublisher {
    /// Creates a publisher with no registered consumers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PublisherState {
                latest: None,
                consumers: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Registers a consumer and returns its subscription id.
    pub fn subscribe(&self, consumer: Arc<dyn SnapshotConsumer>) -> SubscriptionId {
        let mut state = self.state.lock();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.consumers.push((id, consumer));
        id
    }

    /// Removes a previously registered consumer.
    ///
    /// Returns true if the subscription was present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock();
        let before = state.consumers.len();
        state.consumers.retain(|(sub, _)| *sub != id);
        state.consumers.len() != before
    }

    /// Returns the number of registered consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.state.lock().consumers.len()
    }

    /// Returns a copy of the most recent held snapshot, if any.
    #[must_use]
    pub fn latest(&self) -> Option<BookSnapshot> {
        self.state.lock().latest.clone()
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotConsumer for SnapshotPublisher {
    fn process_new_snapshot(&self, snapshot: &BookSnapshot) -> Result<(), ConsumerError> {
        // Deep copy; the live store keeps evolving under the original.
        self.state.lock().latest = Some(snapshot.clone());
        Ok(())
    }

    fn process_end_update(
        &self,
        book: &BookId,
        update_id: UpdateId,
        is_modified: bool,
    ) -> Result<(), ConsumerError> {
        if !is_modified {
            return Ok(());
        }

        let state = self.state.lock();
        let Some(snapshot) = state.latest.as_ref() else {
            tracing::debug!(%book, update_id, "end-of-update with no held snapshot");
            return Ok(());
        };

        for (id, consumer) in &state.consumers {
            if let Err(e) = consumer
                .process_new_snapshot(snapshot)
                .and_then(|()| consumer.process_end_update(book, update_id, true))
            {
                tracing::warn!(%book, subscription = id.0, error = %e, "consumer delivery failed");
            }
        }
        Ok(())
    }

    fn process_no_update(&self, update_id: UpdateId) -> Result<(), ConsumerError> {
        let state = self.state.lock();
        for (id, consumer) in &state.consumers {
            if let Err(e) = consumer.process_no_update(update_id) {
                tracing::warn!(subscription = id.0, error = %e, "no-update delivery failed");
            }
        }
        Ok(())
    }
}
