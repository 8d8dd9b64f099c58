//! End-of-update boundary handling and snapshot materialization.

use crate::error::StoreError;
use crate::store::BookStore;
use bookflow_core::{BROKEN_UPDATE_ID, BookId, BookSnapshot, PriceLevel, Trade, UpdateId};

/// Translates one feed's event stream into store mutations and produces a
/// committed snapshot at each end-of-update boundary.
#[derive(Debug)]
pub struct BookUpdater {
    book: BookId,
    store: BookStore,
    last_event_time_ns: u64,
}

impl BookUpdater {
    /// Creates an updater for the given book.
    #[must_use]
    pub fn new(book: BookId) -> Self {
        let store = BookStore::new(book.side);
        Self {
            book,
            store,
            last_event_time_ns: 0,
        }
    }

    /// Returns the identity of the book this updater maintains.
    #[must_use]
    pub const fn book(&self) -> &BookId {
        &self.book
    }

    /// Returns the source timestamp of the most recent event.
    #[must_use]
    pub const fn last_event_time_ns(&self) -> u64 {
        self.last_event_time_ns
    }

    /// Adds or updates a price level.
    ///
    /// # Errors
    /// Propagates the store's mutation error unchanged.
    pub fn apply_level(&mut self, level: PriceLevel) -> Result<(), StoreError> {
        self.last_event_time_ns = level.source_time_ns;
        self.store.apply_level(level)
    }

    /// Deletes the level resting at a price.
    ///
    /// # Errors
    /// Propagates the store's mutation error unchanged.
    pub fn delete_level(&mut self, price: i64) -> Result<(), StoreError> {
        self.store.delete_level(price).map(|_| ())
    }

    /// Records a trade for the current update cycle.
    pub fn apply_trade(&mut self, trade: Trade) {
        self.last_event_time_ns = trade.source_time_ns;
        self.store.apply_trade(trade);
    }

    /// Clears the live store, keeping it alive for the next snapshot load.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Materializes the current store state into an immutable snapshot.
    ///
    /// Called only when the end-of-update boundary was produced by this
    /// feed's own activity.
    #[must_use]
    pub fn commit(&mut self, update_id: UpdateId, source_time_ns: u64) -> BookSnapshot {
        BookSnapshot {
            book: self.book.clone(),
            levels: self.store.ordered_levels(),
            last_trade: self.store.take_trade(),
            update_id,
            source_time_ns,
        }
    }

    /// Observes an end-of-update boundary that this feed did not originate.
    ///
    /// Performs no mutation whatsoever; the caller signals "no change"
    /// downstream instead of publishing.
    pub fn no_updates(&self, _update_id: UpdateId) {}

    /// Clears the store and issues a synthetic commit marking the source
    /// broken.
    ///
    /// The returned snapshot carries [`BROKEN_UPDATE_ID`] and the current
    /// wall-clock time, so downstream consumers observe an explicit
    /// "book is now empty" event rather than silently stale data.
    #[must_use]
    pub fn source_is_broken(&mut self) -> BookSnapshot {
        self.store.clear();
        let now_ns = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .unsigned_abs();
        self.commit(BROKEN_UPDATE_ID, now_ns)
    }

    /// Read access to the live store.
    #[must_use]
    pub const fn store(&self) -> &BookStore {
        &self.store
    }
}
