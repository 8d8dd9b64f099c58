//! Identity and status types for market-data books.

use serde::{Deserialize, Serialize};

/// Per-feed update sequence number.
///
/// Monotonically increasing for a live feed. The value [`BROKEN_UPDATE_ID`]
/// is reserved and never produced by a healthy feed.
pub type UpdateId = i64;

/// Reserved update id meaning "source disconnected, book forcibly cleared".
pub const BROKEN_UPDATE_ID: UpdateId = -1;

/// Book side (bid or offer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid (buy) side.
    Bid,
    /// Offer (sell) side.
    Offer,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Offer,
            Self::Offer => Self::Bid,
        }
    }

    /// Returns true for the bid side.
    #[must_use]
    pub const fn is_bid(&self) -> bool {
        matches!(self, Self::Bid)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Offer => write!(f, "offer"),
        }
    }
}

/// Identity of one venue feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedId(String);

impl FeedId {
    /// Creates a feed identity from its venue-assigned name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the feed name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FeedId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Stable identity of one (feed, side) book.
///
/// Used to correlate the separately-arriving bid and offer update streams
/// that belong to the same synthetic instrument pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId {
    /// Owning feed.
    pub feed: FeedId,
    /// Book side.
    pub side: Side,
}

impl BookId {
    /// Creates a book identity.
    #[must_use]
    pub fn new(feed: impl Into<FeedId>, side: Side) -> Self {
        Self {
            feed: feed.into(),
            side,
        }
    }
}

impl From<String> for FeedId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.feed, self.side)
    }
}

/// Connection status reported by a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Feed is delivering updates.
    Connected,
    /// Feed lost its upstream connection.
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Bid.opposite(), Side::Offer);
        assert_eq!(Side::Offer.opposite(), Side::Bid);
    }

    #[test]
    fn test_side_is_bid() {
        assert!(Side::Bid.is_bid());
        assert!(!Side::Offer.is_bid());
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Bid.to_string(), "bid");
        assert_eq!(Side::Offer.to_string(), "offer");
    }

    #[test]
    fn test_feed_id_from_str() {
        let feed = FeedId::from("EURUSD.venue-a");
        assert_eq!(feed.as_str(), "EURUSD.venue-a");
    }

    #[test]
    fn test_book_id_display() {
        let book = BookId::new("EURUSD", Side::Offer);
        assert_eq!(book.to_string(), "EURUSD/offer");
    }

    #[test]
    fn test_book_id_equality() {
        let a = BookId::new("EURUSD", Side::Bid);
        let b = BookId::new("EURUSD", Side::Bid);
        let c = BookId::new("EURUSD", Side::Offer);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_broken_update_id_sentinel() {
        assert_eq!(BROKEN_UPDATE_ID, -1);
    }

    #[test]
    fn test_connection_status_equality() {
        assert_eq!(ConnectionStatus::Connected, ConnectionStatus::Connected);
        assert_ne!(ConnectionStatus::Connected, ConnectionStatus::Disconnected);
    }
}
