//! Background reader loop and subscription lifecycle.

use crate::error::ClientError;
use bookflow_transport::{ByteStream, Connector};
use bookflow_wire::{Event, EventCodec, FrameCodec};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;

/// Callback invoked for every decoded event, on the reader task.
pub type EventCallback = Arc<dyn Fn(Event) + Send + Sync>;

/// Configuration for a subscriber.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Bound on the wait for the reader task to exit during close.
    pub join_timeout: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            join_timeout: Duration::from_secs(1),
        }
    }
}

enum State {
    Idle,
    Connecting,
    Running {
        cancel: CancellationToken,
        reader: JoinHandle<()>,
    },
    Closed,
}

/// Remote subscription to a distribution endpoint.
///
/// `connect` opens the transport and spawns a dedicated reader task that
/// decodes one event at a time and hands it to the registered callback.
/// `close` cancels the reader cooperatively and waits a bounded time for
/// it to exit; once closed, every further `connect` is rejected with
/// [`ClientError::ConnectorClosed`]. There is no automatic reconnection.
pub struct Subscriber {
    codec: EventCodec,
    callback: EventCallback,
    config: SubscriberConfig,
    state: Mutex<State>,
}

impl Subscriber {
    /// Creates a subscriber decoding with `codec` and delivering into
    /// `callback`.
    #[must_use]
    pub fn new(codec: EventCodec, callback: EventCallback) -> Self {
        Self::with_config(codec, callback, SubscriberConfig::default())
    }

    /// Creates a subscriber with explicit configuration.
    #[must_use]
    pub fn with_config(
        codec: EventCodec,
        callback: EventCallback,
        config: SubscriberConfig,
    ) -> Self {
        Self {
            codec,
            callback,
            config,
            state: Mutex::new(State::Idle),
        }
    }

    /// Returns true while the reader task is attached.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), State::Running { .. })
    }

    /// Connects through `connector` and starts the reader loop.
    ///
    /// # Errors
    /// Returns [`ClientError::ConnectorClosed`] after `close`,
    /// [`ClientError::AlreadyConnected`] while a connection is up, and
    /// any transport error from the connection attempt.
    pub async fn connect(&self, connector: &mut dyn Connector) -> Result<(), ClientError> {
        {
            let mut state = self.state.lock();
            match *state {
                State::Idle => *state = State::Connecting,
                State::Closed => return Err(ClientError::ConnectorClosed),
                State::Connecting | State::Running { .. } => {
                    return Err(ClientError::AlreadyConnected);
                }
            }
        }

        let stream = match self.open(connector).await {
            Ok(stream) => stream,
            Err(e) => {
                *self.state.lock() = State::Idle;
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        let reader = tokio::spawn(read_loop(
            stream,
            self.codec.clone(),
            Arc::clone(&self.callback),
            cancel.clone(),
        ));

        *self.state.lock() = State::Running { cancel, reader };
        Ok(())
    }

    async fn open(&self, connector: &mut dyn Connector) -> Result<ByteStream, ClientError> {
        connector.connect().await?;
        connector
            .take_stream()
            .ok_or(ClientError::Transport(
                bookflow_transport::TransportError::NotConnected,
            ))
    }

    /// Shuts the subscription down for good.
    ///
    /// Cancels the reader cooperatively and waits up to the configured
    /// join timeout for it to exit. Idempotent; afterwards `connect`
    /// always fails.
    pub async fn close(&self) {
        let previous = {
            let mut state = self.state.lock();
            std::mem::replace(&mut *state, State::Closed)
        };

        if let State::Running { cancel, reader } = previous {
            cancel.cancel();
            if tokio::time::timeout(self.config.join_timeout, reader)
                .await
                .is_err()
            {
                tracing::warn!("reader did not exit within join timeout");
            }
        }
    }
}

async fn read_loop(
    stream: ByteStream,
    codec: EventCodec,
    callback: EventCallback,
    cancel: CancellationToken,
) {
    let mut framed = FramedRead::new(stream, FrameCodec::new());

    loop {
        tokio::select! {
            // Cancellation is checked every iteration; an interrupted read
            // is a shutdown signal, not an error.
            () = cancel.cancelled() => {
                tracing::debug!("reader cancelled");
                break;
            }
            frame = framed.next() => match frame {
                Some(Ok(frame)) => match codec.decode(&frame) {
                    Ok(event) => callback(event),
                    // A bad frame is logged and skipped; the connection
                    // stays up for the next message.
                    Err(e) => tracing::warn!(error = %e, "decode failed, skipping frame"),
                },
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "transport read failed");
                    break;
                }
                None => {
                    tracing::info!("publisher closed the stream");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookflow_transport::PipeConnector;
    use bookflow_wire::{Encoding, Heartbeat, Payload, TypeRegistry};
    use bytes::BytesMut;
    use parking_lot::Mutex as PlMutex;
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::Encoder;

    fn codec() -> EventCodec {
        EventCodec::new(Arc::new(TypeRegistry::with_defaults()), Encoding::Binary)
    }

    fn collecting_callback() -> (EventCallback, Arc<PlMutex<Vec<Event>>>) {
        let events: Arc<PlMutex<Vec<Event>>> = Arc::new(PlMutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: EventCallback = Arc::new(move |event| sink.lock().push(event));
        (callback, events)
    }

    fn frame_of(codec: &EventCodec, event: &Event) -> BytesMut {
        let body = codec.encode(event).unwrap();
        let mut framed = BytesMut::new();
        FrameCodec::new().encode(body.as_slice(), &mut framed).unwrap();
        framed
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
    async fn test_events_reach_callback() {
        let codec = codec();
        let (callback, events) = collecting_callback();
        let subscriber = Subscriber::new(codec.clone(), callback);

        let mut connector = PipeConnector::new();
        subscriber.connect(&mut connector).await.unwrap();
        let mut peer = connector.take_peer().unwrap();

        let event = Event::new("md", Payload::Heartbeat(Heartbeat { sent_time_ns: 5 }));
        peer.write_all(&frame_of(&codec, &event)).await.unwrap();

        wait_for(|| !events.lock().is_empty()).await;
        assert_eq!(events.lock()[0], event);

        subscriber.close().await;
    }

    #[tokio::test]
    async fn test_partial_writes_decode_once() {
        let codec = codec();
        let (callback, events) = collecting_callback();
        let subscriber = Subscriber::new(codec.clone(), callback);

        let mut connector = PipeConnector::new();
        subscriber.connect(&mut connector).await.unwrap();
        let mut peer = connector.take_peer().unwrap();

        let event = Event::new("md", Payload::Heartbeat(Heartbeat { sent_time_ns: 9 }));
        let frame = frame_of(&codec, &event);

        // Dribble the frame across many writes; the reader must emit the
        // event exactly once, after the last byte.
        let (head, tail) = frame.split_at(frame.len() / 2);
        peer.write_all(head).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(events.lock().is_empty());
        peer.write_all(tail).await.unwrap();

        wait_for(|| events.lock().len() == 1).await;
        assert_eq!(events.lock()[0], event);

        subscriber.close().await;
    }

    #[tokio::test]
    async fn test_bad_frame_skipped_stream_continues() {
        let codec = codec();
        let (callback, events) = collecting_callback();
        let subscriber = Subscriber::new(codec.clone(), callback);

        let mut connector = PipeConnector::new();
        subscriber.connect(&mut connector).await.unwrap();
        let mut peer = connector.take_peer().unwrap();

        // A well-framed but undecodable body, then a good event.
        let mut junk = BytesMut::new();
        FrameCodec::new()
            .encode(b"garbage".as_slice(), &mut junk)
            .unwrap();
        peer.write_all(&junk).await.unwrap();

        let event = Event::new("md", Payload::Heartbeat(Heartbeat { sent_time_ns: 1 }));
        peer.write_all(&frame_of(&codec, &event)).await.unwrap();

        wait_for(|| events.lock().len() == 1).await;
        assert_eq!(events.lock()[0], event);

        subscriber.close().await;
    }

    #[tokio::test]
    async fn test_connect_after_close_rejected() {
        let (callback, _events) = collecting_callback();
        let subscriber = Subscriber::new(codec(), callback);

        let mut connector = PipeConnector::new();
        subscriber.connect(&mut connector).await.unwrap();
        subscriber.close().await;
        assert!(!subscriber.is_running());

        let mut fresh = PipeConnector::new();
        let err = subscriber.connect(&mut fresh).await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectorClosed));
    }

    #[tokio::test]
    async fn test_close_before_connect_still_rejects() {
        let (callback, _events) = collecting_callback();
        let subscriber = Subscriber::new(codec(), callback);

        subscriber.close().await;

        let mut connector = PipeConnector::new();
        let err = subscriber.connect(&mut connector).await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectorClosed));
    }

    #[tokio::test]
    async fn test_double_connect_rejected() {
        let (callback, _events) = collecting_callback();
        let subscriber = Subscriber::new(codec(), callback);

        let mut connector = PipeConnector::new();
        subscriber.connect(&mut connector).await.unwrap();

        let mut second = PipeConnector::new();
        let err = subscriber.connect(&mut second).await.unwrap_err();
        assert!(matches!(err, ClientError::AlreadyConnected));

        subscriber.close().await;
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_subscriber_usable() {
        struct NeverConnects;

        #[async_trait::async_trait]
        impl Connector for NeverConnects {
            async fn connect(&mut self) -> Result<(), bookflow_transport::TransportError> {
                Err(bookflow_transport::TransportError::ConnectTimeout)
            }
            fn take_stream(&mut self) -> Option<ByteStream> {
                None
            }
            fn is_ready_to_transmit(&self) -> bool {
                false
            }
            async fn disconnect(&mut self) -> Result<(), bookflow_transport::TransportError> {
                Ok(())
            }
        }

        let (callback, _events) = collecting_callback();
        let subscriber = Subscriber::new(codec(), callback);

        let err = subscriber.connect(&mut NeverConnects).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(!subscriber.is_running());

        // A later attempt with a working connector succeeds.
        let mut connector = PipeConnector::new();
        subscriber.connect(&mut connector).await.unwrap();
        assert!(subscriber.is_running());
        subscriber.close().await;
    }

    #[tokio::test]
    async fn test_publisher_close_ends_reader() {
        let (callback, _events) = collecting_callback();
        let subscriber = Subscriber::new(codec(), callback);

        let mut connector = PipeConnector::new();
        subscriber.connect(&mut connector).await.unwrap();
        let peer = connector.take_peer().unwrap();

        drop(peer);
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Reader exits on its own; close stays clean and idempotent.
        subscriber.close().await;
        subscriber.close().await;
    }
}
