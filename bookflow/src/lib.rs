//! # Bookflow
//!
//! Order-book consistency engine with synchronized bid/offer filters and
//! pub/sub wire distribution.
//!
//! Bookflow ingests raw per-side market-data events from venue feeds,
//! reconstructs internally consistent order books, synchronizes and
//! corrects the resulting bid/offer pairs, and redistributes snapshots to
//! remote subscribers over a compact, self-framing binary protocol.
//!
//! ## Pipeline
//!
//! feed → processor → updater → store → publisher → filter chain →
//! wire distributor → remote subscribers
//!
//! ## Quick Start
//!
//! ```ignore
//! use bookflow::prelude::*;
//!
//! let publisher = Arc::new(SnapshotPublisher::new());
//! let mut bid = BookProcessor::new(BookId::new("EURUSD", Side::Bid), publisher.clone());
//!
//! bid.on_price(level)?;
//! bid.on_end_update(&info, update_id, true)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Price levels, identities, snapshots
//! - [`book`] - Store, updater, processor, publisher
//! - [`filter`] - Slippage rejection and spread correction
//! - [`wire`] - Event envelope, registry, binary/text codecs
//! - [`transport`] - Pipe, TCP, and pub/sub byte transports
//! - [`server`] - Distribution endpoint
//! - [`client`] - Remote subscription

pub mod prelude;

/// Core data model.
pub mod core {
    pub use bookflow_core::*;
}

/// Order-book consistency engine.
pub mod book {
    pub use bookflow_book::*;
}

/// Bid/offer pair synchronization filters.
pub mod filter {
    pub use bookflow_filter::*;
}

/// Event envelope and wire codecs.
pub mod wire {
    pub use bookflow_wire::*;
}

/// Byte transports.
pub mod transport {
    pub use bookflow_transport::*;
}

/// Distribution endpoint.
pub mod server {
    pub use bookflow_server::*;
}

/// Remote subscription.
pub mod client {
    pub use bookflow_client::*;
}

// Re-export commonly used items at the crate root
pub use bookflow_core::{BROKEN_UPDATE_ID, BookId, BookSnapshot, FeedId, PriceLevel, Side, Trade};

pub use bookflow_book::{
    BookProcessor, FeedHandler, SnapshotConsumer, SnapshotPublisher,
};
pub use bookflow_filter::{SlippageFilter, SpreadCorrector};
pub use bookflow_wire::{Encoding, Event, EventCodec, Payload, TypeRegistry};
