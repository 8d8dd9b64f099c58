//! Spread correction filter.

use crate::barrier::{MatchedPair, PairBarrier};
use crate::slippage::forward_pair;
use bookflow_book::{ConsumerError, SnapshotConsumer};
use bookflow_core::{BookId, BookSnapshot, UpdateId};
use parking_lot::Mutex;

struct CorrectorState {
    barrier: PairBarrier,
    prev_bid: Option<i64>,
    prev_offer: Option<i64>,
}

/// Replaces implausible bid/offer spreads with a synthetic one.
///
/// A matched pair whose spread stays within `spread_threshold` passes
/// unmodified. Above the threshold, the side that moved less since the
/// previous cycle is treated as stable and kept; the other side's
/// top-of-book is rewritten to sit `synthetic_spread` away from it. The
/// first cycle has no previous prices and always passes unmodified.
pub struct SpreadCorrector<C> {
    spread_threshold: i64,
    synthetic_spread: i64,
    state: Mutex<CorrectorState>,
    downstream: C,
}

impl<C: SnapshotConsumer> SpreadCorrector<C> {
    /// Creates a corrector with the given threshold and synthetic spread.
    #[must_use]
    pub fn new(spread_threshold: i64, synthetic_spread: i64, downstream: C) -> Self {
        Self {
            spread_threshold,
            synthetic_spread,
            state: Mutex::new(CorrectorState {
                barrier: PairBarrier::new(),
                prev_bid: None,
                prev_offer: None,
            }),
            downstream,
        }
    }

    /// Returns the configured spread threshold.
    #[must_use]
    pub const fn spread_threshold(&self) -> i64 {
        self.spread_threshold
    }

    /// Returns the configured synthetic spread.
    #[must_use]
    pub const fn synthetic_spread(&self) -> i64 {
        self.synthetic_spread
    }

    fn evaluate(
        &self,
        prev_bid: Option<i64>,
        prev_offer: Option<i64>,
        pair: MatchedPair,
    ) -> Result<Option<(i64, i64)>, ConsumerError> {
        let Some((bid, offer)) = pair.top_prices() else {
            tracing::debug!("pair with empty top-of-book, skipping evaluation");
            return Ok(None);
        };

        let spread = (bid - offer).abs();
        if spread <= self.spread_threshold {
            forward_pair(&self.downstream, &pair)?;
            return Ok(Some((bid, offer)));
        }

        let (Some(prev_bid), Some(prev_offer)) = (prev_bid, prev_offer) else {
            // No history yet; forward as observed and start recording.
            forward_pair(&self.downstream, &pair)?;
            return Ok(Some((bid, offer)));
        };

        let bid_delta = (bid - prev_bid).abs();
        let offer_delta = (offer - prev_offer).abs();

        let mut corrected = pair;
        if bid_delta <= offer_delta {
            // Bid is the stable side; resynthesize the offer.
            let synthetic = bid + self.synthetic_spread;
            tracing::info!(bid, offer, synthetic, "spread implausible, correcting offer");
            replace_top_price(corrected.offer.as_mut(), synthetic);
        } else {
            let synthetic = offer - self.synthetic_spread;
            tracing::info!(bid, offer, synthetic, "spread implausible, correcting bid");
            replace_top_price(corrected.bid.as_mut(), synthetic);
        }

        forward_pair(&self.downstream, &corrected)?;
        Ok(Some((bid, offer)))
    }
}

fn replace_top_price(snapshot: Option<&mut BookSnapshot>, price: i64) {
    if let Some(level) = snapshot.and_then(|s| s.levels.first_mut()) {
        level.price = price;
    }
}

impl<C: SnapshotConsumer> SnapshotConsumer for SpreadCorrector<C> {
    fn process_new_snapshot(&self, snapshot: &BookSnapshot) -> Result<(), ConsumerError> {
        self.state.lock().barrier.cache_snapshot(snapshot);
        Ok(())
    }

    fn process_end_update(
        &self,
        book: &BookId,
        update_id: UpdateId,
        is_modified: bool,
    ) -> Result<(), ConsumerError> {
        let mut state = self.state.lock();
        if let Some(pair) = state.barrier.end_update(book, update_id, is_modified) {
            // The matched pair already holds copies, so mutating the
            // corrected side never touches the barrier's caches.
            let observed = self.evaluate(state.prev_bid, state.prev_offer, pair)?;
            if let Some((bid, offer)) = observed {
                state.prev_bid = Some(bid);
                state.prev_offer = Some(offer);
            }
        }
        Ok(())
    }

    fn process_no_update(&self, update_id: UpdateId) -> Result<(), ConsumerError> {
        self.downstream.process_no_update(update_id)
    }
}
