//! Alias-to-decoder registry.

use crate::binary::FrameReader;
use crate::error::WireError;
use crate::event::Payload;
use std::collections::HashMap;

/// Decode entry for one payload alias, covering both encodings.
#[derive(Clone, Copy)]
pub struct PayloadDecoder {
    /// Decoder for the binary tagged encoding.
    pub binary: fn(&mut FrameReader<'_>) -> Result<Payload, WireError>,
    /// Decoder for the readable text encoding.
    pub text: fn(serde_json::Value) -> Result<Payload, WireError>,
}

/// Maps short wire aliases to payload decoders.
///
/// An alias must be registered before any decode that references it;
/// unknown aliases fail with [`WireError::UnknownAlias`]. Keeping the
/// catalog explicit lets client and server evolve their registered types
/// independently of each other.
#[derive(Default)]
pub struct TypeRegistry {
    entries: HashMap<String, PayloadDecoder>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in payload type.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            Payload::BOOK_ALIAS,
            PayloadDecoder {
                binary: crate::binary::decode_book,
                text: crate::text::decode_book,
            },
        );
        registry.register(
            Payload::TRADE_ALIAS,
            PayloadDecoder {
                binary: crate::binary::decode_trade,
                text: crate::text::decode_trade,
            },
        );
        registry.register(
            Payload::HEARTBEAT_ALIAS,
            PayloadDecoder {
                binary: crate::binary::decode_heartbeat,
                text: crate::text::decode_heartbeat,
            },
        );
        registry.register(
            Payload::SOURCE_STATUS_ALIAS,
            PayloadDecoder {
                binary: crate::binary::decode_source_status,
                text: crate::text::decode_source_status,
            },
        );
        registry
    }

    /// Registers a decoder under an alias, replacing any previous entry.
    pub fn register(&mut self, alias: impl Into<String>, decoder: PayloadDecoder) {
        self.entries.insert(alias.into(), decoder);
    }

    /// Looks up the decoder for an alias.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&PayloadDecoder> {
        self.entries.get(alias)
    }

    /// Returns true if the alias is registered.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Returns all registered aliases.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_knows_nothing() {
        let registry = TypeRegistry::new();
        assert!(!registry.contains(Payload::BOOK_ALIAS));
        assert!(registry.get("book").is_none());
        assert!(registry.aliases().is_empty());
    }

    #[test]
    fn test_defaults_cover_all_builtin_aliases() {
        let registry = TypeRegistry::with_defaults();
        for alias in [
            Payload::BOOK_ALIAS,
            Payload::TRADE_ALIAS,
            Payload::HEARTBEAT_ALIAS,
            Payload::SOURCE_STATUS_ALIAS,
        ] {
            assert!(registry.contains(alias), "missing alias {alias}");
        }
        assert_eq!(registry.aliases().len(), 4);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TypeRegistry::new();
        registry.register(
            "hb",
            PayloadDecoder {
                binary: crate::binary::decode_heartbeat,
                text: crate::text::decode_heartbeat,
            },
        );
        assert!(registry.contains("hb"));

        registry.register(
            "hb",
            PayloadDecoder {
                binary: crate::binary::decode_trade,
                text: crate::text::decode_trade,
            },
        );
        assert_eq!(registry.aliases().len(), 1);
    }
}
