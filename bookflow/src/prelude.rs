//! Prelude module for convenient imports.
//!
//! ```ignore
//! use bookflow::prelude::*;
//! ```

// Core types
pub use bookflow_core::{
    BROKEN_UPDATE_ID, BookId, BookSnapshot, ConnectionStatus, FeedId, PriceLevel, Side, Trade,
    UpdateId,
};

// Book engine
pub use bookflow_book::{
    BookProcessor, BookStore, BookUpdater, ConsumerError, FeedError, FeedHandler, ProcessorState,
    SnapshotConsumer, SnapshotPublisher, StoreError,
};

// Filters
pub use bookflow_filter::{PairBarrier, SlippageFilter, SpreadCorrector};

// Wire layer
pub use bookflow_wire::{
    Encoding, Event, EventCodec, FrameCodec, Heartbeat, Payload, SourceStatus, TypeRegistry,
    WireError,
};

// Transports
pub use bookflow_transport::{
    Connector, Endpoint, EndpointDirectory, PipeConnector, PubSocket, PubSocketConfig,
    StaticDirectory, TcpConnector, TcpConnectorConfig, TransportError,
};

// Distribution endpoint and subscription
pub use bookflow_client::{ClientError, EventCallback, Subscriber, SubscriberConfig};
pub use bookflow_server::{
    DistributionServer, DistributionServerConfig, ServerError, SessionManager, WireDistributor,
};
