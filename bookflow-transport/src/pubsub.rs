//! One-to-many fan-out socket.
//!
//! A [`PubSocket`] accepts subscriber connections and pushes every
//! published frame to each of them. Frames arrive already self-framed by
//! the wire codec; the socket moves bytes verbatim. Subscribers connect
//! with any byte-stream connector pointed at the socket's address, such as
//! [`TcpConnector`](crate::tcp::TcpConnector), and only ever read.

use crate::error::TransportError;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Observer of subscriber session lifecycle.
pub trait SessionObserver: Send + Sync {
    /// A subscriber connected.
    fn on_session_start(&self, _session_id: u64, _peer: SocketAddr) {}

    /// A subscriber went away.
    fn on_session_end(&self, _session_id: u64) {}
}

/// Observer that ignores every session event.
pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// Configuration for the fan-out socket.
#[derive(Debug, Clone)]
pub struct PubSocketConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Outbound frame queue length per session.
    pub session_queue: usize,
    /// Enable TCP_NODELAY on subscriber sockets.
    pub nodelay: bool,
}

impl Default for PubSocketConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9440".parse().unwrap(),
            session_queue: 1024,
            nodelay: true,
        }
    }
}

impl PubSocketConfig {
    /// Creates a config with the given bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Sets the per-session outbound queue length.
    #[must_use]
    pub fn session_queue(mut self, len: usize) -> Self {
        self.session_queue = len;
        self
    }
}

type SessionMap = Arc<Mutex<HashMap<u64, mpsc::Sender<Bytes>>>>;

/// Publishing side of the pub/sub transport.
pub struct PubSocket {
    local_addr: SocketAddr,
    sessions: SessionMap,
    observer: Arc<dyn SessionObserver>,
    cancel: CancellationToken,
    accept_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl PubSocket {
    /// Binds the socket and starts accepting subscribers.
    ///
    /// # Errors
    /// Returns `TransportError` if binding fails.
    pub async fn bind(
        config: PubSocketConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        let sessions: SessionMap = Arc::new(Mutex::new(HashMap::new()));
        let cancel = CancellationToken::new();

        let accept_task = tokio::spawn(accept_loop(
            listener,
            config,
            Arc::clone(&sessions),
            Arc::clone(&observer),
            cancel.clone(),
        ));

        tracing::info!(%local_addr, "pub socket listening");
        Ok(Self {
            local_addr,
            sessions,
            observer,
            cancel,
            accept_task: Mutex::new(Some(accept_task)),
        })
    }

    /// Returns the bound address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the number of connected subscribers.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Pushes one framed message to every connected subscriber.
    ///
    /// A subscriber with a full queue misses this frame; a subscriber
    /// whose session died is dropped. Neither affects the others.
    pub fn publish(&self, frame: Bytes) {
        let mut dead = Vec::new();
        {
            let sessions = self.sessions.lock();
            for (id, tx) in sessions.iter() {
                match tx.try_send(frame.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(session = *id, "session queue full, dropping frame");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => dead.push(*id),
                }
            }
        }
        for id in dead {
            if self.sessions.lock().remove(&id).is_some() {
                self.observer.on_session_end(id);
            }
        }
    }

    /// Stops accepting, disconnects all subscribers, and waits briefly for
    /// the accept loop to exit. Idempotent.
    pub async fn close(&self) {
        self.cancel.cancel();
        let task = self.accept_task.lock().take();
        if let Some(task) = task {
            let _ = tokio::time::timeout(Duration::from_secs(1), task).await;
        }
        self.sessions.lock().clear();
    }
}

async fn accept_loop(
    listener: TcpListener,
    config: PubSocketConfig,
    sessions: SessionMap,
    observer: Arc<dyn SessionObserver>,
    cancel: CancellationToken,
) {
    let mut next_id: u64 = 1;
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nodelay(config.nodelay) {
                        tracing::debug!(error = %e, "set_nodelay failed");
                    }
                    let id = next_id;
                    next_id += 1;

                    let (tx, rx) = mpsc::channel(config.session_queue);
                    sessions.lock().insert(id, tx);
                    observer.on_session_start(id, peer);
                    tracing::debug!(session = id, %peer, "subscriber connected");

                    tokio::spawn(session_loop(
                        id,
                        stream,
                        rx,
                        Arc::clone(&sessions),
                        Arc::clone(&observer),
                        cancel.clone(),
                    ));
                }
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            },
        }
    }
}

async fn session_loop(
    id: u64,
    mut stream: TcpStream,
    mut rx: mpsc::Receiver<Bytes>,
    sessions: SessionMap,
    observer: Arc<dyn SessionObserver>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            frame = rx.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = stream.write_all(&frame).await {
                        tracing::debug!(session = id, error = %e, "subscriber write failed");
                        break;
                    }
                }
                None => break,
            },
        }
    }
    if sessions.lock().remove(&id).is_some() {
        observer.on_session_end(id);
    }
    tracing::debug!(session = id, "subscriber session ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;

    fn local_config() -> PubSocketConfig {
        PubSocketConfig::new("127.0.0.1:0".parse().unwrap())
    }

    async fn wait_for<F: Fn() -> bool>(cond: F) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let socket = PubSocket::bind(local_config(), Arc::new(NullObserver))
            .await
            .unwrap();
        let addr = socket.local_addr();

        let mut sub_a = TcpStream::connect(addr).await.unwrap();
        let mut sub_b = TcpStream::connect(addr).await.unwrap();
        wait_for(|| socket.session_count() == 2).await;

        socket.publish(Bytes::from_static(b"frame-1"));

        let mut buf = [0u8; 7];
        sub_a.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"frame-1");
        sub_b.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"frame-1");

        socket.close().await;
    }

    #[tokio::test]
    async fn test_observer_sees_session_lifecycle() {
        struct Counting {
            started: AtomicUsize,
            ended: AtomicUsize,
        }
        impl SessionObserver for Counting {
            fn on_session_start(&self, _id: u64, _peer: SocketAddr) {
                self.started.fetch_add(1, Ordering::SeqCst);
            }
            fn on_session_end(&self, _id: u64) {
                self.ended.fetch_add(1, Ordering::SeqCst);
            }
        }

        let observer = Arc::new(Counting {
            started: AtomicUsize::new(0),
            ended: AtomicUsize::new(0),
        });
        let socket = PubSocket::bind(local_config(), observer.clone())
            .await
            .unwrap();

        let sub = TcpStream::connect(socket.local_addr()).await.unwrap();
        wait_for(|| observer.started.load(Ordering::SeqCst) == 1).await;

        drop(sub);
        // The dead session is noticed on the next write attempt.
        for _ in 0..50 {
            socket.publish(Bytes::from_static(b"x"));
            if observer.ended.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(observer.ended.load(Ordering::SeqCst), 1);

        socket.close().await;
    }

    #[tokio::test]
    async fn test_dead_subscriber_does_not_block_others() {
        let socket = PubSocket::bind(local_config(), Arc::new(NullObserver))
            .await
            .unwrap();
        let addr = socket.local_addr();

        let dead = TcpStream::connect(addr).await.unwrap();
        let mut live = TcpStream::connect(addr).await.unwrap();
        wait_for(|| socket.session_count() == 2).await;
        drop(dead);

        // Publish enough frames to hit the dead socket's error path.
        for _ in 0..10 {
            socket.publish(Bytes::from_static(b"beat"));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let mut buf = [0u8; 4];
        live.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"beat");

        socket.close().await;
    }
}
