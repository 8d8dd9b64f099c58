//! Example subscriber printing distributed books.
//!
//! Run with: `cargo run --example subscriber`

use bookflow::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Discovery is an external collaborator; a fixed directory stands in.
    let mut directory = StaticDirectory::new();
    directory.insert("EURUSD", Endpoint::new("127.0.0.1", 9440, Encoding::Binary));
    let endpoint = directory
        .lookup("EURUSD", Encoding::Binary)
        .ok_or("endpoint not found")?;

    let registry = Arc::new(TypeRegistry::with_defaults());
    let codec = EventCodec::new(registry, endpoint.content_type);

    let callback: EventCallback = Arc::new(|event| match event.payload {
        Payload::Book(snap) => println!(
            "[subscriber] {} {} top={:?} depth={} update_id={}",
            event.source,
            snap.book,
            snap.top_price(),
            snap.depth(),
            snap.update_id,
        ),
        other => println!("[subscriber] {} {other:?}", event.source),
    });

    let subscriber = Subscriber::new(codec, callback);
    let mut connector = TcpConnector::new(TcpConnectorConfig::new(endpoint.socket_addr()?));
    subscriber.connect(&mut connector).await?;
    println!("[subscriber] connected to {}, ctrl-c to exit", connector.addr());

    tokio::signal::ctrl_c().await?;
    subscriber.close().await;
    Ok(())
}
