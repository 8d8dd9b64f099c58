//! # Bookflow Filter
//!
//! Two-phase bid/offer synchronization filters.
//!
//! The bid and offer books of one instrument pair arrive as independent
//! update streams. Each filter in this crate buffers whichever side shows
//! up first, waits for the matching end-of-update of the opposite side,
//! then evaluates the pair as a unit before anything reaches the
//! downstream consumer.
//!
//! This crate provides:
//! - [`barrier`] - The two-stream barrier state shared by all pair filters
//! - [`slippage`] - Drops pairs whose bid/offer gap exceeds a threshold
//! - [`spread`] - Replaces implausible spreads with a synthetic one

pub mod barrier;
pub mod slippage;
pub mod spread;

pub use barrier::{EndSignal, MatchedPair, PairBarrier};
pub use slippage::SlippageFilter;
pub use spread::SpreadCorrector;
