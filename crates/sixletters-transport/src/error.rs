/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The peer's WebSocket handshake failed, timed out, or was refused.
    #[error("upgrade failed: {0}")]
    UpgradeFailed(#[source] std::io::Error),

    /// The peer sent a frame the text protocol has no use for.
    #[error("unexpected {0} frame")]
    UnexpectedFrame(&'static str),
}
