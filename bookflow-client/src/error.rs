//! Error types for subscription operations.

use thiserror::Error;

/// Error type for subscription operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] bookflow_transport::TransportError),

    /// The subscriber was closed; it never reconnects.
    #[error("connector closed")]
    ConnectorClosed,

    /// A connection is already established or being established.
    #[error("already connected")]
    AlreadyConnected,
}
