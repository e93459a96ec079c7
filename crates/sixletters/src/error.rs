//! Unified error type for the Sixletters server.

use sixletters_protocol::ProtocolError;
use sixletters_room::RoomError;
use sixletters_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SixlettersError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed word list, bad message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (unknown round, name taken, actor gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// An admin or health listener failed.
    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),

    /// The server was configured with a value it cannot run with.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let err: SixlettersError = err.into();
        assert!(matches!(err, SixlettersError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::MalformedWord("Cat".into());
        let err: SixlettersError = err.into();
        assert!(matches!(err, SixlettersError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NameTaken("bob".into());
        let err: SixlettersError = err.into();
        assert!(matches!(err, SixlettersError::Room(_)));
        assert!(err.to_string().contains("bob"));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::from(std::io::ErrorKind::AddrInUse);
        let err: SixlettersError = err.into();
        assert!(matches!(err, SixlettersError::Io(_)));
    }
}
