//! Error types for the room layer.

use sixletters_protocol::{PlayerNumber, RoomCode};

/// Errors that can occur during round and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No round is registered under this code.
    #[error("round {0} not found")]
    NotFound(RoomCode),

    /// A connected player already uses this name.
    #[error("name {0} is taken")]
    NameTaken(String),

    /// A request named a player the round never had. This is a bug in the
    /// caller; the round's actor stops when it sees one.
    #[error("round has no player {0}")]
    UnknownPlayer(PlayerNumber),

    /// The round's actor has stopped.
    #[error("round is unavailable")]
    GameUnavailable,

    /// The registry actor has stopped.
    #[error("hub is unavailable")]
    HubUnavailable,
}
