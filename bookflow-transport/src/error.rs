//! Error types for transport operations.

use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection timeout.
    #[error("connection timeout")]
    ConnectTimeout,

    /// Connection closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,

    /// Operation requires an established connection.
    #[error("not connected")]
    NotConnected,

    /// Address parse error.
    #[error("address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    /// Endpoint lookup returned nothing.
    #[error("endpoint not found for product {product:?}")]
    EndpointNotFound {
        /// Product code that was looked up.
        product: String,
    },
}
