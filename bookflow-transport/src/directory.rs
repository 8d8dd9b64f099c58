//! Consumed-only endpoint lookup.
//!
//! Discovery itself lives elsewhere; this module only models the lookup
//! result used to open a transport connection.

use bookflow_wire::Encoding;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Network address of one distribution endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Encoding the endpoint speaks.
    pub content_type: Encoding,
}

impl Endpoint {
    /// Creates an endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, content_type: Encoding) -> Self {
        Self {
            host: host.into(),
            port,
            content_type,
        }
    }

    /// Resolves the endpoint to a socket address.
    ///
    /// # Errors
    /// Returns the parse error for hosts that are not literal addresses.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Lookup of distribution endpoints by product and encoding.
pub trait EndpointDirectory: Send + Sync {
    /// Returns the endpoint publishing `product` in `content_type`, if any.
    fn lookup(&self, product: &str, content_type: Encoding) -> Option<Endpoint>;
}

/// Fixed in-memory directory, built at construction time.
#[derive(Default)]
pub struct StaticDirectory {
    entries: HashMap<(String, Encoding), Endpoint>,
}

impl StaticDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint for a product.
    pub fn insert(&mut self, product: impl Into<String>, endpoint: Endpoint) {
        self.entries
            .insert((product.into(), endpoint.content_type), endpoint);
    }
}

impl EndpointDirectory for StaticDirectory {
    fn lookup(&self, product: &str, content_type: Encoding) -> Option<Endpoint> {
        self.entries
            .get(&(product.to_owned(), content_type))
            .cloned()
    }
}
