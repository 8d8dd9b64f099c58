//! In-process duplex pipe transport.

use crate::connector::{ByteStream, Connector};
use crate::error::TransportError;
use async_trait::async_trait;
use tokio::io::DuplexStream;

/// Default pipe buffer capacity in bytes.
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

/// Connector backed by an in-process byte pipe.
///
/// `connect` creates both ends of the pipe; the far end is retrieved with
/// [`PipeConnector::take_peer`] and driven by whatever plays the server
/// role in-process. Mostly useful for tests and single-process wiring.
pub struct PipeConnector {
    capacity: usize,
    stream: Option<ByteStream>,
    peer: Option<DuplexStream>,
    connected: bool,
}

impl PipeConnector {
    /// Creates a pipe connector with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PIPE_CAPACITY)
    }

    /// Creates a pipe connector with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            stream: None,
            peer: None,
            connected: false,
        }
    }

    /// Moves the far end of the pipe out of the connector.
    ///
    /// Returns `None` before `connect` or after the peer was taken.
    pub fn take_peer(&mut self) -> Option<DuplexStream> {
        self.peer.take()
    }
}

impl Default for PipeConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for PipeConnector {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let (near, far) = tokio::io::duplex(self.capacity);
        self.stream = Some(Box::new(near));
        self.peer = Some(far);
        self.connected = true;
        Ok(())
    }

    fn take_stream(&mut self) -> Option<ByteStream> {
        self.stream.take()
    }

    fn is_ready_to_transmit(&self) -> bool {
        self.connected
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.stream = None;
        self.peer = None;
        self.connected = false;
        Ok(())
    }
}
