//! Mutable per-(feed, side) price level store.

use crate::error::StoreError;
use bookflow_core::{PriceLevel, Side, Trade};
use std::collections::BTreeMap;

/// One side's live order book, keyed by price.
///
/// Created once per (feed, side) and cleared, never destroyed, on new
/// snapshots or source failure. Not internally thread-safe; callers
/// serialize events per (feed, side).
#[derive(Debug)]
pub struct BookStore {
    side: Side,
    levels: BTreeMap<i64, PriceLevel>,
    pending_trade: Option<Trade>,
}

impl BookStore {
    /// Creates an empty store for the given side.
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            pending_trade: None,
        }
    }

    /// Returns the side this store holds.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Adds a level or replaces the one resting at the same price.
    ///
    /// # Errors
    /// Returns `StoreError::SideMismatch` if the level belongs to the
    /// opposite side.
    pub fn apply_level(&mut self, level: PriceLevel) -> Result<(), StoreError> {
        if level.side != self.side {
            return Err(StoreError::SideMismatch {
                level_side: level.side,
                store_side: self.side,
            });
        }
        self.levels.insert(level.price, level);
        Ok(())
    }

    /// Removes the level resting at a price.
    ///
    /// # Errors
    /// Returns `StoreError::UnknownLevel` if no level rests there.
    pub fn delete_level(&mut self, price: i64) -> Result<PriceLevel, StoreError> {
        self.levels
            .remove(&price)
            .ok_or(StoreError::UnknownLevel { price })
    }

    /// Records a trade for the current update cycle.
    pub fn apply_trade(&mut self, trade: Trade) {
        self.pending_trade = Some(trade);
    }

    /// Takes the trade recorded since the last commit, if any.
    pub fn take_trade(&mut self) -> Option<Trade> {
        self.pending_trade.take()
    }

    /// Drops all levels and any pending trade.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.pending_trade = None;
    }

    /// Returns the best level by side convention.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&PriceLevel> {
        if self.side.is_bid() {
            self.levels.values().next_back()
        } else {
            self.levels.values().next()
        }
    }

    /// Returns all levels ordered best-to-worst.
    #[must_use]
    pub fn ordered_levels(&self) -> Vec<PriceLevel> {
        if self.side.is_bid() {
            self.levels.values().rev().copied().collect()
        } else {
            self.levels.values().copied().collect()
        }
    }

    /// Returns the number of resting levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if no levels rest in the store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
