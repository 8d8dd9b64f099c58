//! Example publisher distributing synchronized EURUSD books.
//!
//! Run with: `cargo run --example publisher`

use bookflow::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let registry = Arc::new(TypeRegistry::with_defaults());
    let config = DistributionServerConfig::new("127.0.0.1:9440".parse()?);
    let server = DistributionServer::bind(config, registry).await?;
    println!("[publisher] serving on {}", server.local_addr());

    // Publisher -> slippage rejection -> spread correction -> wire fan-out.
    let distributor = Arc::new(server.distributor("EURUSD"));
    let corrector = Arc::new(SpreadCorrector::new(50, 20, distributor));
    let chain = Arc::new(SlippageFilter::new(100, corrector));

    let publisher = Arc::new(SnapshotPublisher::new());
    publisher.subscribe(chain);

    let bid_book = BookId::new("EURUSD", Side::Bid);
    let offer_book = BookId::new("EURUSD", Side::Offer);
    let mut bid = BookProcessor::new(bid_book.clone(), Arc::clone(&publisher));
    let mut offer = BookProcessor::new(offer_book.clone(), Arc::clone(&publisher));

    let mut update_id: UpdateId = 0;
    loop {
        update_id += 1;
        let seq = update_id.unsigned_abs();
        let time_ns = seq * 1_000_000;
        let wobble = update_id % 7;

        bid.on_price(PriceLevel {
            price: 118_200 + wobble,
            size: 1_000_000,
            side: Side::Bid,
            seq,
            source_time_ns: time_ns,
            dealable: true,
        })?;
        bid.on_end_update(&bid_book, update_id, true)?;

        offer.on_price(PriceLevel {
            price: 118_220 + wobble,
            size: 2_000_000,
            side: Side::Offer,
            seq,
            source_time_ns: time_ns,
            dealable: true,
        })?;
        offer.on_end_update(&offer_book, update_id, true)?;

        println!(
            "[publisher] cycle {update_id} published to {} subscriber(s)",
            server.sessions().count()
        );
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}
