//! Error types for book operations.

use crate::consumer::ConsumerError;
use bookflow_core::Side;
use thiserror::Error;

/// Error type for store mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A level arrived for the wrong side of the book.
    #[error("side mismatch: level is {level_side}, store is {store_side}")]
    SideMismatch {
        /// Side carried by the level.
        level_side: Side,
        /// Side of the store.
        store_side: Side,
    },

    /// A delete referenced a price with no resting level.
    #[error("unknown price level {price}")]
    UnknownLevel {
        /// Price that was not found.
        price: i64,
    },
}

/// Feed-level fault raised by the processor.
///
/// Wraps the failing store mutation together with a rendering of the
/// originating feed event for diagnostics. Never retried internally.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A store mutation failed.
    #[error("store failure handling {event}: {source}")]
    Store {
        /// Rendering of the feed event that caused the failure.
        event: String,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// A downstream consumer rejected delivery.
    #[error("downstream consumer failure: {0}")]
    Consumer(#[from] ConsumerError),
}

impl FeedError {
    /// Wraps a store error with its originating event.
    pub fn store(event: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            event: event.into(),
            source,
        }
    }
}
