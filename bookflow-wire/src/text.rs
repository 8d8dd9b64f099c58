//! Human-readable JSON encoding for diagnostics.
//!
//! One JSON document per frame: `{"source": ..., "type": <alias>,
//! "data": <payload>}`. Slower and wider than the binary encoding, but
//! greppable on the wire.

use crate::error::WireError;
use crate::event::{Event, Heartbeat, Payload, SourceStatus};
use crate::registry::TypeRegistry;
use bookflow_core::{BookSnapshot, Trade};
use serde_json::{Value, json};

/// Encodes a whole event as one JSON frame body.
///
/// # Errors
/// Returns `WireError` if the payload fails to serialize.
pub fn encode_event(event: &Event) -> Result<Vec<u8>, WireError> {
    let data = match &event.payload {
        Payload::Book(snapshot) => serde_json::to_value(snapshot)?,
        Payload::Trade(trade) => serde_json::to_value(trade)?,
        Payload::Heartbeat(hb) => serde_json::to_value(hb)?,
        Payload::SourceStatus(status) => serde_json::to_value(status)?,
    };
    let frame = json!({
        "source": event.source,
        "type": event.payload.alias(),
        "data": data,
    });
    Ok(serde_json::to_vec(&frame)?)
}

/// Decodes one JSON frame body into an event.
///
/// # Errors
/// Returns `WireError` for malformed documents and unregistered aliases.
pub fn decode_event(frame: &[u8], registry: &TypeRegistry) -> Result<Event, WireError> {
    let mut value: Value = serde_json::from_slice(frame)?;
    let source = value
        .get("source")
        .and_then(Value::as_str)
        .ok_or_else(|| WireError::malformed_text("missing string field \"source\""))?
        .to_owned();
    let alias = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| WireError::malformed_text("missing string field \"type\""))?
        .to_owned();
    let data = value
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| WireError::malformed_text("missing field \"data\""))?;

    let decoder = registry
        .get(&alias)
        .ok_or(WireError::UnknownAlias { alias })?;
    let payload = (decoder.text)(data)?;
    Ok(Event { source, payload })
}

/// Text decoder for [`Payload::Book`].
pub fn decode_book(data: Value) -> Result<Payload, WireError> {
    Ok(Payload::Book(serde_json::from_value::<BookSnapshot>(data)?))
}

/// Text decoder for [`Payload::Trade`].
pub fn decode_trade(data: Value) -> Result<Payload, WireError> {
    Ok(Payload::Trade(serde_json::from_value::<Trade>(data)?))
}

/// Text decoder for [`Payload::Heartbeat`].
pub fn decode_heartbeat(data: Value) -> Result<Payload, WireError> {
    Ok(Payload::Heartbeat(serde_json::from_value::<Heartbeat>(
        data,
    )?))
}

/// Text decoder for [`Payload::SourceStatus`].
pub fn decode_source_status(data: Value) -> Result<Payload, WireError> {
    Ok(Payload::SourceStatus(serde_json::from_value::<SourceStatus>(
        data,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookflow_core::{BookId, ConnectionStatus, FeedId, PriceLevel, Side};

    fn registry() -> TypeRegistry {
        TypeRegistry::with_defaults()
    }

    fn sample_event() -> Event {
        let mut snapshot = BookSnapshot::empty(BookId::new("EURUSD", Side::Bid), 4, 99);
        snapshot.levels = vec![PriceLevel {
            price: 118_250,
            size: 1_000_000,
            side: Side::Bid,
            seq: 4,
            source_time_ns: 99,
            dealable: true,
        }];
        Event::new("md-gateway", Payload::Book(snapshot))
    }

    #[test]
    fn test_round_trip_book() {
        let event = sample_event();
        let bytes = encode_event(&event).unwrap();
        assert_eq!(decode_event(&bytes, &registry()).unwrap(), event);
    }

    #[test]
    fn test_round_trip_all_payloads() {
        let events = vec![
            sample_event(),
            Event::new(
                "t",
                Payload::Trade(Trade {
                    price: 5,
                    size: 6,
                    aggressor: Side::Offer,
                    source_time_ns: 7,
                }),
            ),
            Event::new("h", Payload::Heartbeat(Heartbeat { sent_time_ns: 8 })),
            Event::new(
                "s",
                Payload::SourceStatus(SourceStatus {
                    feed: FeedId::new("EURUSD"),
                    status: ConnectionStatus::Connected,
                }),
            ),
        ];
        for event in events {
            let bytes = encode_event(&event).unwrap();
            assert_eq!(decode_event(&bytes, &registry()).unwrap(), event);
        }
    }

    #[test]
    fn test_frame_is_readable_json() {
        let bytes = encode_event(&sample_event()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"type\":\"book\""));
        assert!(text.contains("\"source\":\"md-gateway\""));
    }

    #[test]
    fn test_unknown_alias_rejected() {
        let bytes = encode_event(&sample_event()).unwrap();
        let err = decode_event(&bytes, &TypeRegistry::new()).unwrap_err();
        assert!(matches!(err, WireError::UnknownAlias { alias } if alias == "book"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = decode_event(br#"{"type":"book"}"#, &registry()).unwrap_err();
        assert!(matches!(err, WireError::MalformedText { .. }));

        let err = decode_event(br#"{"source":"x","type":"book"}"#, &registry()).unwrap_err();
        assert!(matches!(err, WireError::MalformedText { .. }));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = decode_event(b"not json at all", &registry()).unwrap_err();
        assert!(matches!(err, WireError::Json(_)));
    }
}
