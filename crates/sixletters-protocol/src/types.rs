//! Core protocol types for the Sixletters line protocol.
//!
//! Every message is a single text frame. Control lines sent by the engine
//! start with `:`; the catch-up lines a joining player receives (the
//! roster and the word list) are bare space-separated lists.

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's permanent position in a round.
///
/// Assigned in join order and kept for the lifetime of the round, even
/// while the player is disconnected. The host is always player 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerNumber(pub usize);

impl PlayerNumber {
    /// The host of every round.
    pub const HOST: PlayerNumber = PlayerNumber(0);
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The short code a round is registered under, e.g. `"x7k2p"`.
///
/// Includes the deployment prefix, if one is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a round's player list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// The player's display name.
    pub name: String,
    /// Whether the player currently has a live connection.
    pub connected: bool,
}

/// Renders as the name, with a trailing `_` when disconnected.
impl fmt::Display for RosterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.connected {
            f.write_str("_")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Client → engine
// ---------------------------------------------------------------------------

/// An in-game action sent by a joined player.
///
/// Decoded with [`decode_command`](crate::decode_command). The word list
/// and the name are read before a player is in a round and are not
/// commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `:attempt <word>`: guess a word.
    Attempt(String),
    /// `:giveup`: vote to reveal the remaining words.
    GiveUp,
    /// `:ungiveup`: withdraw that vote.
    UnGiveUp,
}

// ---------------------------------------------------------------------------
// Engine → client
// ---------------------------------------------------------------------------

/// A line the engine sends to a player.
///
/// `Display` produces the exact wire text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// The code of a freshly hosted round, sent bare to the host.
    Code(RoomCode),
    /// `:ok`: the round exists; send a name.
    Ok,
    /// `:taken`: a connected player already uses that name.
    Taken,
    /// `:badname`: the name is not 1–10 alphanumerics.
    BadName,
    /// `:noexist`: no round is registered under the requested code.
    NoExist,
    /// `:join <name>`: someone joined or rejoined.
    Join(String),
    /// `:quit <name>`: someone disconnected.
    Quit(String),
    /// `:attempt <word> <guesser>`: a word was solved. During catch-up
    /// the guesser of a revealed word is the reveal marker.
    Attempt { word: String, guesser: String },
    /// `:giveup <name>`
    GiveUp(String),
    /// `:ungiveup <name>`
    UnGiveUp(String),
    /// `:allgiveup`: every connected player gave up; the round is over.
    AllGiveUp,
    /// Catch-up: every player in join order.
    Roster(Vec<RosterEntry>),
    /// Catch-up: every word in the round.
    Words(Vec<String>),
}

impl fmt::Display for ServerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Ok => f.write_str(":ok"),
            Self::Taken => f.write_str(":taken"),
            Self::BadName => f.write_str(":badname"),
            Self::NoExist => f.write_str(":noexist"),
            Self::Join(name) => write!(f, ":join {name}"),
            Self::Quit(name) => write!(f, ":quit {name}"),
            Self::Attempt { word, guesser } => {
                write!(f, ":attempt {word} {guesser}")
            }
            Self::GiveUp(name) => write!(f, ":giveup {name}"),
            Self::UnGiveUp(name) => write!(f, ":ungiveup {name}"),
            Self::AllGiveUp => f.write_str(":allgiveup"),
            Self::Roster(players) => write_joined(f, players),
            Self::Words(words) => write_joined(f, words),
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
