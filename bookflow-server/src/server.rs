//! Fan-out distribution endpoint.

use crate::distributor::WireDistributor;
use crate::error::ServerError;
use crate::session::SessionManager;
use bookflow_transport::{PubSocket, PubSocketConfig};
use bookflow_wire::{Encoding, EventCodec, TypeRegistry};
use std::net::SocketAddr;
use std::sync::Arc;

/// Configuration for the distribution endpoint.
#[derive(Debug, Clone)]
pub struct DistributionServerConfig {
    /// Address to bind the fan-out socket to.
    pub bind_addr: SocketAddr,
    /// Wire encoding served to subscribers.
    pub encoding: Encoding,
    /// Outbound frame queue length per subscriber session.
    pub session_queue: usize,
}

impl DistributionServerConfig {
    /// Creates a config for the given bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            encoding: Encoding::Binary,
            session_queue: 1024,
        }
    }

    /// Sets the wire encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the per-session outbound queue length.
    #[must_use]
    pub fn session_queue(mut self, len: usize) -> Self {
        self.session_queue = len;
        self
    }
}

/// Distribution endpoint: fan-out socket plus session registry.
pub struct DistributionServer {
    socket: Arc<PubSocket>,
    sessions: Arc<SessionManager>,
    codec: EventCodec,
}

impl DistributionServer {
    /// Binds the endpoint and starts accepting subscribers.
    ///
    /// # Errors
    /// Returns `ServerError` if binding fails.
    pub async fn bind(
        config: DistributionServerConfig,
        registry: Arc<TypeRegistry>,
    ) -> Result<Self, ServerError> {
        let sessions = Arc::new(SessionManager::new());
        let socket_config =
            PubSocketConfig::new(config.bind_addr).session_queue(config.session_queue);
        let socket = Arc::new(
            PubSocket::bind(
                socket_config,
                Arc::clone(&sessions) as Arc<dyn bookflow_transport::SessionObserver>,
            )
            .await?,
        );

        Ok(Self {
            socket,
            sessions,
            codec: EventCodec::new(registry, config.encoding),
        })
    }

    /// Returns the bound address.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.socket.local_addr()
    }

    /// Returns the session registry.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Creates a terminal consumer publishing under `source`.
    ///
    /// Wire this at the end of a filter chain; several distributors with
    /// different source identities may share the endpoint.
    #[must_use]
    pub fn distributor(&self, source: impl Into<String>) -> WireDistributor {
        WireDistributor::new(source, self.codec.clone(), Arc::clone(&self.socket))
    }

    /// Stops accepting and disconnects every subscriber.
    pub async fn close(&self) {
        self.socket.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookflow_book::SnapshotConsumer;
    use bookflow_core::{BookId, BookSnapshot, PriceLevel, Side};
    use bookflow_wire::{FrameCodec, Payload};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_util::codec::FramedRead;

    fn local_config() -> DistributionServerConfig {
        DistributionServerConfig::new("127.0.0.1:0".parse().unwrap())
    }

    fn snapshot() -> BookSnapshot {
        let mut snap = BookSnapshot::empty(BookId::new("EURUSD", Side::Bid), 3, 50);
        snap.levels = vec![PriceLevel {
            price: 118_250,
            size: 1_000_000,
            side: Side::Bid,
            seq: 3,
            source_time_ns: 50,
            dealable: true,
        }];
        snap
    }

    async fn wait_for_sessions(server: &DistributionServer, n: usize) {
        for _ in 0..200 {
            if server.sessions().count() == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {n} sessions");
    }

    #[tokio::test]
    async fn test_snapshot_reaches_subscriber_decoded() {
        let registry = Arc::new(TypeRegistry::with_defaults());
        let server = DistributionServer::bind(local_config(), Arc::clone(&registry))
            .await
            .unwrap();

        let stream = TcpStream::connect(server.local_addr()).await.unwrap();
        wait_for_sessions(&server, 1).await;

        let distributor = server.distributor("md-gateway");
        let snap = snapshot();
        distributor.process_new_snapshot(&snap).unwrap();

        let mut framed = FramedRead::new(stream, FrameCodec::new());
        let frame = framed.next().await.unwrap().unwrap();

        let codec = EventCodec::new(registry, Encoding::Binary);
        let event = codec.decode(&frame).unwrap();
        assert_eq!(event.source, "md-gateway");
        assert_eq!(event.payload, Payload::Book(snap));

        server.close().await;
    }

    #[tokio::test]
    async fn test_text_encoding_end_to_end() {
        let registry = Arc::new(TypeRegistry::with_defaults());
        let server = DistributionServer::bind(
            local_config().encoding(Encoding::Text),
            Arc::clone(&registry),
        )
        .await
        .unwrap();

        let stream = TcpStream::connect(server.local_addr()).await.unwrap();
        wait_for_sessions(&server, 1).await;

        server
            .distributor("diag")
            .publish_heartbeat()
            .unwrap();

        let mut framed = FramedRead::new(stream, FrameCodec::new());
        let frame = framed.next().await.unwrap().unwrap();
        let text = String::from_utf8(frame.to_vec()).unwrap();
        assert!(text.contains("\"type\":\"hb\""));

        server.close().await;
    }

    #[tokio::test]
    async fn test_boundary_signals_send_nothing() {
        let registry = Arc::new(TypeRegistry::with_defaults());
        let server = DistributionServer::bind(local_config(), registry)
            .await
            .unwrap();

        let stream = TcpStream::connect(server.local_addr()).await.unwrap();
        wait_for_sessions(&server, 1).await;

        let distributor = server.distributor("md");
        let book = BookId::new("EURUSD", Side::Bid);
        distributor.process_end_update(&book, 1, true).unwrap();
        distributor.process_no_update(2).unwrap();
        // A heartbeat afterwards must be the first frame on the wire.
        distributor.publish_heartbeat().unwrap();

        let mut framed = FramedRead::new(stream, FrameCodec::new());
        let frame = framed.next().await.unwrap().unwrap();
        let codec = EventCodec::new(Arc::new(TypeRegistry::with_defaults()), Encoding::Binary);
        let event = codec.decode(&frame).unwrap();
        assert!(matches!(event.payload, Payload::Heartbeat(_)));

        server.close().await;
    }

    #[tokio::test]
    async fn test_fan_out_to_multiple_subscribers() {
        let registry = Arc::new(TypeRegistry::with_defaults());
        let server = DistributionServer::bind(local_config(), Arc::clone(&registry))
            .await
            .unwrap();

        let a = TcpStream::connect(server.local_addr()).await.unwrap();
        let b = TcpStream::connect(server.local_addr()).await.unwrap();
        wait_for_sessions(&server, 2).await;

        let snap = snapshot();
        server
            .distributor("md")
            .process_new_snapshot(&snap)
            .unwrap();

        let codec = EventCodec::new(registry, Encoding::Binary);
        for stream in [a, b] {
            let mut framed = FramedRead::new(stream, FrameCodec::new());
            let frame = framed.next().await.unwrap().unwrap();
            let event = codec.decode(&frame).unwrap();
            assert_eq!(event.payload, Payload::Book(snap.clone()));
        }

        server.close().await;
    }
}
