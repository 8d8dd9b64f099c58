//! # Bookflow Book
//!
//! Order-book consistency engine for one venue feed.
//!
//! This crate provides:
//! - [`store`] - Mutable per-(feed, side) price level store
//! - [`updater`] - End-of-update boundary handling and snapshot materialization
//! - [`processor`] - Feed callback adapter with connection-state handling
//! - [`publisher`] - Change-gated snapshot fan-out to registered consumers
//! - [`consumer`] - The three-method downstream consumer contract

pub mod consumer;
pub mod error;
pub mod processor;
pub mod publisher;
pub mod store;
pub mod updater;

pub use consumer::{ConsumerError, SnapshotConsumer};
pub use error::{FeedError, StoreError};
pub use processor::{BookProcessor, FeedHandler, ProcessorState};
pub use publisher::SnapshotPublisher;
pub use store::BookStore;
pub use updater::BookUpdater;
