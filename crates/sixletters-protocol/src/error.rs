//! Error types for the protocol layer.
//!
//! Each crate in Sixletters defines its own error enum. When you see a
//! `ProtocolError`, the problem is in what a client sent, not in
//! networking or round management.

/// Errors that can occur while parsing client input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The host's word list has more tokens than a round allows.
    #[error("too many words: {0} (max {max})", max = crate::MAX_WORDS)]
    TooManyWords(usize),

    /// A token is not 3–6 lowercase letters with an optional trailing `_`.
    #[error("malformed word: {0:?}")]
    MalformedWord(String),

    /// Two tokens name the same word once the `_` marker is stripped.
    #[error("duplicate word: {0}")]
    DuplicateWord(String),

    /// The message is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
