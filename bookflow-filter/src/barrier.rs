//! Two-stream barrier state for bid/offer pair synchronization.

use bookflow_core::{BookId, BookSnapshot, Side, UpdateId};

/// One side's end-of-update boundary, as buffered by the barrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndSignal {
    /// Book that reached the boundary.
    pub book: BookId,
    /// Update id of the boundary.
    pub update_id: UpdateId,
    /// Whether the book was modified this cycle.
    pub is_modified: bool,
}

/// A matched (bid end, offer end) pair released by the barrier.
///
/// Snapshots are copies of the barrier's side caches at match time; the
/// caches themselves persist into the next cycle.
#[derive(Debug, Clone)]
pub struct MatchedPair {
    /// Latest cached bid snapshot, if any arrived yet.
    pub bid: Option<BookSnapshot>,
    /// Latest cached offer snapshot, if any arrived yet.
    pub offer: Option<BookSnapshot>,
    /// The bid side's boundary.
    pub bid_end: EndSignal,
    /// The offer side's boundary.
    pub offer_end: EndSignal,
}

impl MatchedPair {
    /// Returns both top-of-book prices, if both sides have one.
    #[must_use]
    pub fn top_prices(&self) -> Option<(i64, i64)> {
        let bid = self.bid.as_ref()?.top_price()?;
        let offer = self.offer.as_ref()?.top_price()?;
        Some((bid, offer))
    }
}

/// Buffers the first-arriving side of an update cycle until the opposite
/// side's end-of-update shows up.
///
/// Matching uses end-of-update signals only, keyed by book side; snapshots
/// are value-cached independently and survive across cycles. Both end
/// slots reset as soon as a pair is released, so the barrier is re-entrant
/// for the next cycle.
///
/// Not internally synchronized: the owning filter wraps it in a single
/// lock covering snapshot arrival and end-update arrival for both sides.
#[derive(Debug, Default)]
pub struct PairBarrier {
    last_bid: Option<BookSnapshot>,
    last_offer: Option<BookSnapshot>,
    bid_end: Option<EndSignal>,
    offer_end: Option<EndSignal>,
}

impl PairBarrier {
    /// Creates an empty barrier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches a side's latest snapshot.
    pub fn cache_snapshot(&mut self, snapshot: &BookSnapshot) {
        match snapshot.book.side {
            Side::Bid => self.last_bid = Some(snapshot.clone()),
            Side::Offer => self.last_offer = Some(snapshot.clone()),
        }
    }

    /// Records a side's end-of-update boundary.
    ///
    /// Returns the matched pair once both sides have reached a boundary;
    /// the end slots are reset before returning. A repeated boundary for
    /// the same side before the opposite side arrives replaces the
    /// buffered one.
    pub fn end_update(
        &mut self,
        book: &BookId,
        update_id: UpdateId,
        is_modified: bool,
    ) -> Option<MatchedPair> {
        let signal = EndSignal {
            book: book.clone(),
            update_id,
            is_modified,
        };
        match book.side {
            Side::Bid => self.bid_end = Some(signal),
            Side::Offer => self.offer_end = Some(signal),
        }

        if self.bid_end.is_some() && self.offer_end.is_some() {
            let bid_end = self.bid_end.take()?;
            let offer_end = self.offer_end.take()?;
            Some(MatchedPair {
                bid: self.last_bid.clone(),
                offer: self.last_offer.clone(),
                bid_end,
                offer_end,
            })
        } else {
            None
        }
    }

    /// Returns true if a bid boundary is buffered and waiting.
    #[must_use]
    pub fn bid_end_pending(&self) -> bool {
        self.bid_end.is_some()
    }

    /// Returns true if an offer boundary is buffered and waiting.
    #[must_use]
    pub fn offer_end_pending(&self) -> bool {
        self.offer_end.is_some()
    }
}
