//! # Bookflow Client
//!
//! Remote subscription to a snapshot distribution endpoint.
//!
//! This crate provides:
//! - [`subscriber`] - Background reader loop decoding one event at a time
//! - Cooperative cancellation with a bounded wait on shutdown
//! - A closed subscriber that rejects reconnection outright

pub mod error;
pub mod subscriber;

pub use error::ClientError;
pub use subscriber::{EventCallback, Subscriber, SubscriberConfig};
