//! Slippage rejection filter.

use crate::barrier::{MatchedPair, PairBarrier};
use bookflow_book::{ConsumerError, SnapshotConsumer};
use bookflow_core::{BookId, BookSnapshot, UpdateId};
use parking_lot::Mutex;

/// Drops synchronized bid/offer pairs whose top-of-book gap exceeds a
/// configured threshold.
///
/// Pairs within the threshold are forwarded untouched; rejected pairs are
/// logged and never reach the downstream consumer. A pair with either side's
/// top-of-book absent is skipped without evaluation.
pub struct SlippageFilter<C> {
    max_slippage: i64,
    barrier: Mutex<PairBarrier>,
    downstream: C,
}

impl<C: SnapshotConsumer> SlippageFilter<C> {
    /// Creates a filter rejecting pairs with `|bid - offer| > max_slippage`.
    #[must_use]
    pub fn new(max_slippage: i64, downstream: C) -> Self {
        Self {
            max_slippage,
            barrier: Mutex::new(PairBarrier::new()),
            downstream,
        }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub const fn max_slippage(&self) -> i64 {
        self.max_slippage
    }

    fn evaluate(&self, pair: &MatchedPair) -> Result<(), ConsumerError> {
        let Some((bid, offer)) = pair.top_prices() else {
            tracing::debug!("pair with empty top-of-book, skipping evaluation");
            return Ok(());
        };

        let slippage = (bid - offer).abs();
        if slippage > self.max_slippage {
            tracing::info!(
                bid,
                offer,
                slippage,
                max = self.max_slippage,
                "slippage above threshold, dropping pair"
            );
            return Ok(());
        }

        forward_pair(&self.downstream, pair)
    }
}

/// Delivers a matched pair downstream: both snapshots, then both boundaries.
pub(crate) fn forward_pair<C: SnapshotConsumer>(
    downstream: &C,
    pair: &MatchedPair,
) -> Result<(), ConsumerError> {
    if let Some(bid) = &pair.bid {
        downstream.process_new_snapshot(bid)?;
    }
    if let Some(offer) = &pair.offer {
        downstream.process_new_snapshot(offer)?;
    }
    downstream.process_end_update(
        &pair.bid_end.book,
        pair.bid_end.update_id,
        pair.bid_end.is_modified,
    )?;
    downstream.process_end_update(
        &pair.offer_end.book,
        pair.offer_end.update_id,
        pair.offer_end.is_modified,
    )
}

impl<C: SnapshotConsumer> SnapshotConsumer for SlippageFilter<C> {
    fn process_new_snapshot(&self, snapshot: &BookSnapshot) -> Result<(), ConsumerError> {
        self.barrier.lock().cache_snapshot(snapshot);
        Ok(())
    }

    fn process_end_update(
        &self,
        book: &BookId,
        update_id: UpdateId,
        is_modified: bool,
    ) -> Result<(), ConsumerError> {
        // Evaluation and forwarding stay inside the barrier lock so a
        // concurrent opposite-side boundary cannot interleave with the
        // flag reset.
        let mut barrier = self.barrier.lock();
        if let Some(pair) = barrier.end_update(book, update_id, is_modified) {
            self.evaluate(&pair)?;
        }
        Ok(())
    }

    fn process_no_update(&self, update_id: UpdateId) -> Result<(), ConsumerError> {
        self.downstream.process_no_update(update_id)
    }
}
