//! Direct TCP stream transport.

use crate::connector::{ByteStream, Connector};
use crate::error::TransportError;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Configuration for the TCP connector.
#[derive(Debug, Clone)]
pub struct TcpConnectorConfig {
    /// Endpoint address to connect to.
    pub addr: SocketAddr,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Enable TCP_NODELAY.
    pub nodelay: bool,
}

impl TcpConnectorConfig {
    /// Creates a config for the given endpoint address.
    #[must_use]
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_secs(5),
            nodelay: true,
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the TCP_NODELAY option.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = enabled;
        self
    }
}

/// Connector opening one direct TCP stream.
pub struct TcpConnector {
    config: TcpConnectorConfig,
    stream: Option<ByteStream>,
    connected: bool,
}

impl TcpConnector {
    /// Creates a connector with the given configuration.
    #[must_use]
    pub fn new(config: TcpConnectorConfig) -> Self {
        Self {
            config,
            stream: None,
            connected: false,
        }
    }

    /// Returns the configured endpoint address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.config.addr
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let stream = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(self.config.addr),
        )
        .await
        .map_err(|_| TransportError::ConnectTimeout)?
        .map_err(TransportError::Io)?;

        stream.set_nodelay(self.config.nodelay)?;
        tracing::debug!(addr = %self.config.addr, "connected");

        self.stream = Some(Box::new(stream));
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
        self.connected = false;
        Ok(())
    }
}
