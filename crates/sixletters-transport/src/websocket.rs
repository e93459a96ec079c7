//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::StatusCode;

use crate::{
    Connection, ConnectionId, Incoming, OriginPolicy, Transport,
    TransportError,
};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How long a peer gets to finish the upgrade before it is dropped.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    origin: OriginPolicy,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            origin: OriginPolicy::default(),
        })
    }

    /// Replaces the origin policy applied to upgrade requests.
    pub fn with_origin_policy(mut self, origin: OriginPolicy) -> Self {
        self.origin = origin;
        self
    }
}

impl Transport for WebSocketTransport {
    type Incoming = IncomingConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        Ok(IncomingConnection {
            stream,
            addr,
            origin: self.origin.clone(),
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A TCP peer that has not sent its upgrade request yet.
pub struct IncomingConnection {
    stream: TcpStream,
    addr: SocketAddr,
    origin: OriginPolicy,
}

impl IncomingConnection {
    /// Returns the peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Incoming for IncomingConnection {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    /// Runs the WebSocket handshake, capturing the request path and
    /// enforcing the origin policy. Peers that take longer than five
    /// seconds are dropped.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error> {
        let Self {
            stream,
            addr,
            origin,
        } = self;

        let mut path = String::new();
        let callback = |req: &Request, resp: Response| {
            path = req.uri().path().to_string();
            let header = |name: &str| {
                req.headers().get(name).and_then(|v| v.to_str().ok())
            };
            if origin.allows(header("origin"), header("host")) {
                Ok(resp)
            } else {
                tracing::warn!(%addr, "rejected upgrade from foreign origin");
                Err(forbidden())
            }
        };

        let ws = tokio::time::timeout(
            HANDSHAKE_TIMEOUT,
            tokio_tungstenite::accept_hdr_async(stream, callback),
        )
        .await
        .map_err(|_| {
            TransportError::UpgradeFailed(std::io::ErrorKind::TimedOut.into())
        })?
        .map_err(|e| {
            TransportError::UpgradeFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, %path, "accepted WebSocket connection");

        let (sink, source) = ws.split();
        Ok(WebSocketConnection {
            id,
            path,
            sink: Mutex::new(sink),
            source: Mutex::new(source),
        })
    }
}

fn forbidden() -> ErrorResponse {
    let mut resp = ErrorResponse::new(Some("origin not allowed".to_string()));
    *resp.status_mut() = StatusCode::FORBIDDEN;
    resp
}

/// A single WebSocket connection.
///
/// The read and write halves are locked separately so one task can wait
/// on [`recv`](Connection::recv) while another sends.
pub struct WebSocketConnection {
    id: ConnectionId,
    path: String,
    sink: Mutex<SplitSink<WsStream, Message>>,
    source: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        loop {
            let msg = self.source.lock().await.next().await;
            match msg {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(_))) => {
                    return Err(TransportError::UnexpectedFrame("binary"));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn path(&self) -> &str {
        &self.path
    }
}
