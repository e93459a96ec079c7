//! Wire protocol for Sixletters.
//!
//! This crate defines the "language" that players and the game engine
//! speak:
//!
//! - **Types** ([`PlayerNumber`], [`RoomCode`], [`RosterEntry`],
//!   [`ClientCommand`], [`ServerLine`]): what travels on the wire.
//! - **Codec** ([`decode_command`], [`ServerLine`]'s `Display`): how
//!   those messages become text frames and back.
//! - **Word sets** ([`WordSet`], [`Guesser`]): the host's secret word
//!   list and who solved each word.
//! - **Errors** ([`ProtocolError`]): what can go wrong while parsing.
//!
//! The protocol layer doesn't know about connections or rounds; it only
//! knows how to read and write messages.
//!
//! ```text
//! Transport (text frames) → Protocol (commands/lines) → Room (actors)
//! ```

mod codec;
mod error;
mod types;
mod words;

pub use codec::{
    decode_command, is_valid_code, is_valid_name, is_valid_prefix,
    is_valid_word, MAX_NAME_LEN,
};
pub use error::ProtocolError;
pub use types::{
    ClientCommand, PlayerNumber, RoomCode, RosterEntry, ServerLine,
};
pub use words::{Guesser, WordSet, MAX_WORDS, REVEALED_MARKER};
