//! # Bookflow Core
//!
//! Core data model for the bookflow market-data pipeline.
//!
//! This crate provides:
//! - Book identity types (feed, side) used to correlate bid/offer streams
//! - Price level, trade, and connection status types
//! - Immutable book snapshots with best-first level ordering
//! - The reserved update-id sentinel for broken sources

pub mod snapshot;
pub mod types;

pub use snapshot::{BookSnapshot, PriceLevel, Trade};
pub use types::{BROKEN_UPDATE_ID, BookId, ConnectionStatus, FeedId, Side, UpdateId};
