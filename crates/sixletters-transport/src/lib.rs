//! Transport abstraction layer for Sixletters.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the network protocol players connect with. Every message on a
//! connection is one UTF-8 text frame.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    IncomingConnection, WebSocketConnection, WebSocketTransport,
};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Which browser origins may open a connection.
///
/// Checked against the `Origin` and `Host` headers of the upgrade request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    /// The host named in `Origin` must equal the `Host` header.
    /// Requests without an `Origin` header (non-browser clients) pass.
    #[default]
    SameHost,
    /// Accept every origin. Meant for local development.
    Any,
    /// The `Host` header must equal this value exactly.
    Host(String),
}

impl OriginPolicy {
    /// Returns `true` if an upgrade carrying these headers is allowed.
    pub fn allows(&self, origin: Option<&str>, host: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Host(allowed) => host == Some(allowed.as_str()),
            Self::SameHost => {
                let Some(origin) = origin else {
                    return true;
                };
                let origin_host = origin
                    .split_once("://")
                    .map_or(origin, |(_, rest)| rest)
                    .trim_end_matches('/');
                host.is_some_and(|h| h.eq_ignore_ascii_case(origin_host))
            }
        }
    }
}

/// Accepts new incoming connections.
///
/// Accepting only takes the peer off the listener. The protocol handshake
/// happens in [`Incoming::upgrade`], so a slow peer never holds up the
/// accept loop.
pub trait Transport: Send + Sync + 'static {
    /// A peer that has not finished its handshake yet.
    type Incoming: Incoming;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming peer.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<std::net::SocketAddr>;
}

/// An accepted peer, waiting for its handshake.
pub trait Incoming: Send + 'static {
    /// The connection produced by a successful handshake.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// Runs the handshake and returns the established connection.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that carries text messages.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one text message to the remote peer.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next text message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the request path the connection was opened with.
    fn path(&self) -> &str;
}
