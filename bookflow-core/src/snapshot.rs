//! Price levels, trades, and immutable book snapshots.

use crate::types::{BROKEN_UPDATE_ID, BookId, Side, UpdateId};
use serde::{Deserialize, Serialize};

/// One price level of an order book.
///
/// Prices are venue-relative integers scaled by the instrument's point
/// value, never floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Fixed-point price.
    pub price: i64,
    /// Total size at this level.
    pub size: u64,
    /// Side this level belongs to.
    pub side: Side,
    /// Per-feed sequence of the update that produced this level.
    pub seq: u64,
    /// Source timestamp (nanoseconds).
    pub source_time_ns: u64,
    /// Whether the level is dealable.
    pub dealable: bool,
}

/// A trade print reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Fixed-point trade price.
    pub price: i64,
    /// Traded size.
    pub size: u64,
    /// Aggressing side.
    pub aggressor: Side,
    /// Source timestamp (nanoseconds).
    pub source_time_ns: u64,
}

/// Immutable snapshot of one book side at an end-of-update boundary.
///
/// `levels` is ordered best-to-worst by side convention: descending prices
/// for a bid book, ascending for an offer book. Index 0 is top-of-book.
///
/// A snapshot is a value type. Once handed to a publisher it must be cloned
/// before any further mutation; the live store keeps evolving underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// Identity of the book this snapshot was taken from.
    pub book: BookId,
    /// Ordered price levels, rank 0 = best.
    pub levels: Vec<PriceLevel>,
    /// Trade associated with this update cycle, if any.
    pub last_trade: Option<Trade>,
    /// Update id of the boundary that produced the snapshot.
    pub update_id: UpdateId,
    /// Source timestamp of the boundary (nanoseconds).
    pub source_time_ns: u64,
}

impl BookSnapshot {
    /// Creates an empty snapshot for a book.
    #[must_use]
    pub fn empty(book: BookId, update_id: UpdateId, source_time_ns: u64) -> Self {
        Self {
            book,
            levels: Vec::new(),
            last_trade: None,
            update_id,
            source_time_ns,
        }
    }

    /// Returns the top-of-book level, if the book is non-empty.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&PriceLevel> {
        self.levels.first()
    }

    /// Returns the top-of-book price, if the book is non-empty.
    #[inline]
    #[must_use]
    pub fn top_price(&self) -> Option<i64> {
        self.top().map(|l| l.price)
    }

    /// Returns the number of price levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if the snapshot carries no price levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns true if this snapshot was produced by a broken source.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.update_id == BROKEN_UPDATE_ID
    }
}
