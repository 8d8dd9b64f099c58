//! # Bookflow Server
//!
//! Distribution endpoint for filtered book snapshots.
//!
//! This crate provides:
//! - [`session`] - Registry of connected subscriber sessions
//! - [`distributor`] - Terminal consumer encoding events onto the wire
//! - [`server`] - Fan-out endpoint assembling socket, sessions, and codec

pub mod distributor;
pub mod error;
pub mod server;
pub mod session;

pub use distributor::WireDistributor;
pub use error::ServerError;
pub use server::{DistributionServer, DistributionServerConfig};
pub use session::{Session, SessionManager};
