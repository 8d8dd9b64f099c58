//! Feed callback adapter driving one (feed, side) book.

use crate::consumer::SnapshotConsumer;
use crate::error::FeedError;
use crate::updater::BookUpdater;
use bookflow_core::{BookId, ConnectionStatus, PriceLevel, Trade, UpdateId};

/// Upstream feed callback interface.
///
/// One implementor per (feed, side); callers must serialize events per
/// (feed, side), the handler is not internally thread-safe.
pub trait FeedHandler {
    /// A price level was added or updated.
    ///
    /// # Errors
    /// Returns `FeedError` if the book mutation fails.
    fn on_price(&mut self, level: PriceLevel) -> Result<(), FeedError>;

    /// The level resting at `price` was deleted.
    ///
    /// # Errors
    /// Returns `FeedError` if the book mutation fails.
    fn on_delete(&mut self, price: i64) -> Result<(), FeedError>;

    /// A trade printed.
    ///
    /// # Errors
    /// Returns `FeedError` if the book mutation fails.
    fn on_trade(&mut self, trade: Trade) -> Result<(), FeedError>;

    /// The feed is about to deliver a full snapshot; the book restarts.
    ///
    /// # Errors
    /// Returns `FeedError` if the book mutation fails.
    fn on_new_snapshot(&mut self) -> Result<(), FeedError>;

    /// An end-of-update boundary arrived.
    ///
    /// `is_mine` is true when this feed's own activity triggered the
    /// boundary; otherwise a companion side did.
    ///
    /// # Errors
    /// Returns `FeedError` if commit or downstream delivery fails.
    fn on_end_update(
        &mut self,
        info: &BookId,
        update_id: UpdateId,
        is_mine: bool,
    ) -> Result<(), FeedError>;

    /// The feed's connection status changed.
    ///
    /// # Errors
    /// Returns `FeedError` if downstream delivery fails.
    fn on_connection_alert(&mut self, status: ConnectionStatus) -> Result<(), FeedError>;
}

/// Connection-derived processor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// Feed is live; updates flow into the store.
    Active,
    /// Source broke; the book was forcibly cleared and awaits a snapshot.
    Cleared,
}

/// Per-(feed, side) adapter wiring feed callbacks into a [`BookUpdater`]
/// and a downstream consumer.
pub struct BookProcessor<C> {
    updater: BookUpdater,
    state: ProcessorState,
    downstream: C,
}

impl<C: SnapshotConsumer> BookProcessor<C> {
    /// Creates a processor for the given book, delivering into `downstream`.
    #[must_use]
    pub fn new(book: BookId, downstream: C) -> Self {
        Self {
            updater: BookUpdater::new(book),
            state: ProcessorState::Active,
            downstream,
        }
    }

    /// Returns the current connection-derived state.
    #[must_use]
    pub const fn state(&self) -> ProcessorState {
        self.state
    }

    /// Returns the identity of the book this processor drives.
    #[must_use]
    pub const fn book(&self) -> &BookId {
        self.updater.book()
    }

    /// Read access to the updater, for inspection.
    #[must_use]
    pub const fn updater(&self) -> &BookUpdater {
        &self.updater
    }
}

impl<C: SnapshotConsumer> FeedHandler for BookProcessor<C> {
    fn on_price(&mut self, level: PriceLevel) -> Result<(), FeedError> {
        self.updater
            .apply_level(level)
            .map_err(|e| FeedError::store(format!("price {level:?}"), e))
    }

    fn on_delete(&mut self, price: i64) -> Result<(), FeedError> {
        self.updater
            .delete_level(price)
            .map_err(|e| FeedError::store(format!("delete price={price}"), e))
    }

    fn on_trade(&mut self, trade: Trade) -> Result<(), FeedError> {
        self.updater.apply_trade(trade);
        Ok(())
    }

    fn on_new_snapshot(&mut self) -> Result<(), FeedError> {
        tracing::debug!(book = %self.book(), "new snapshot signal, clearing book");
        self.updater.clear();
        self.state = ProcessorState::Active;
        Ok(())
    }

    fn on_end_update(
        &mut self,
        _info: &BookId,
        update_id: UpdateId,
        is_mine: bool,
    ) -> Result<(), FeedError> {
        if is_mine {
            let time_ns = self.updater.last_event_time_ns();
            let snapshot = self.updater.commit(update_id, time_ns);
            let book = snapshot.book.clone();
            self.downstream.process_new_snapshot(&snapshot)?;
            self.downstream.process_end_update(&book, update_id, true)?;
        } else {
            self.updater.no_updates(update_id);
            self.downstream.process_no_update(update_id)?;
        }
        Ok(())
    }

    fn on_connection_alert(&mut self, status: ConnectionStatus) -> Result<(), FeedError> {
        match status {
            ConnectionStatus::Connected => {
                tracing::info!(book = %self.book(), "feed connected");
                Ok(())
            }
            ConnectionStatus::Disconnected => {
                tracing::warn!(book = %self.book(), "feed disconnected, clearing book");
                let snapshot = self.updater.source_is_broken();
                self.state = ProcessorState::Cleared;
                let book = snapshot.book.clone();
                self.downstream.process_new_snapshot(&snapshot)?;
                self.downstream
                    .process_end_update(&book, snapshot.update_id, true)?;
                Ok(())
            }
        }
    }
}
