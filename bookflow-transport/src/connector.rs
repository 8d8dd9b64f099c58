//! Transport abstraction.

use crate::error::TransportError;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// A raw duplex byte stream handed out by a connector.
///
/// Carries input and output for one connection; framing is layered on top
/// by the wire codec.
pub type ByteStream = Box<dyn Duplex>;

/// Marker trait for boxed duplex streams.
pub trait Duplex: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Duplex for T {}

/// A way of opening one byte-stream connection to a distribution endpoint.
///
/// Connectors are single-connection: `connect` establishes the stream,
/// `take_stream` hands its ownership to the session that reads and writes
/// it, and `disconnect` marks the connector idle again. A connector never
/// reconnects on its own.
#[async_trait]
pub trait Connector: Send {
    /// Establishes the connection.
    ///
    /// # Errors
    /// Returns `TransportError` if the connection cannot be established.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Moves the established stream out of the connector.
    ///
    /// Returns `None` before `connect` or after the stream was taken.
    fn take_stream(&mut self) -> Option<ByteStream>;

    /// Returns true between a successful `connect` and `disconnect`.
    fn is_ready_to_transmit(&self) -> bool;

    /// Tears the connection down.
    ///
    /// Dropping an untaken stream closes it; a taken stream is closed by
    /// whoever owns it.
    ///
    /// # Errors
    /// Returns `TransportError` if teardown fails.
    async fn disconnect(&mut self) -> Result<(), TransportError>;
}
