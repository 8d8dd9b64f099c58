//! Downstream consumer contract.
//!
//! Publishers, filters, and the wire distributor all speak the same
//! three-method interface, so stages compose as a decorator chain.

use bookflow_core::{BookId, BookSnapshot, UpdateId};
use std::sync::Arc;
use thiserror::Error;

/// Error type for consumer deliveries.
#[derive(Debug, Error)]
#[error("consumer error: {message}")]
pub struct ConsumerError {
    /// Error message.
    pub message: String,
}

impl ConsumerError {
    /// Creates a consumer error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receiver of committed book snapshots and update-cycle boundaries.
///
/// Implementations must treat a received snapshot as a value: clone before
/// holding it past the call.
pub trait SnapshotConsumer: Send + Sync {
    /// Delivers a committed snapshot for one book side.
    ///
    /// # Errors
    /// Returns `ConsumerError` if the consumer cannot accept the snapshot.
    fn process_new_snapshot(&self, snapshot: &BookSnapshot) -> Result<(), ConsumerError>;

    /// Signals the end of an update cycle for one book side.
    ///
    /// # Errors
    /// Returns `ConsumerError` if the consumer cannot process the boundary.
    fn process_end_update(
        &self,
        book: &BookId,
        update_id: UpdateId,
        is_modified: bool,
    ) -> Result<(), ConsumerError>;

    /// Signals an update cycle that left this book unchanged.
    ///
    /// # Errors
    /// Returns `ConsumerError` if the consumer cannot process the signal.
    fn process_no_update(&self, update_id: UpdateId) -> Result<(), ConsumerError>;
}

impl<T: SnapshotConsumer + ?Sized> SnapshotConsumer for Arc<T> {
    fn process_new_snapshot(&self, snapshot: &BookSnapshot) -> Result<(), ConsumerError> {
        (**self).process_new_snapshot(snapshot)
    }

    fn process_end_update(
        &self,
        book: &BookId,
        update_id: UpdateId,
        is_modified: bool,
    ) -> Result<(), ConsumerError> {
        (**self).process_end_update(book, update_id, is_modified)
    }

    fn process_no_update(&self, update_id: UpdateId) -> Result<(), ConsumerError> {
        (**self).process_no_update(update_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_error_display() {
        let err = ConsumerError::new("slow subscriber");
        assert!(err.to_string().contains("slow subscriber"));
        assert!(err.to_string().contains("consumer error"));
    }
}
