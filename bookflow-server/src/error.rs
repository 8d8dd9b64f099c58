//! Error types for the distribution endpoint.

use thiserror::Error;

/// Error type for server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] bookflow_transport::TransportError),

    /// Wire codec error.
    #[error("wire error: {0}")]
    Wire(#[from] bookflow_wire::WireError),
}
