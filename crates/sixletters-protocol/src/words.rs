//! The host's word list and who solved each word.

use std::collections::BTreeMap;
use std::fmt;

use crate::{ProtocolError, is_valid_word};

/// Most tokens a host may submit for one round.
pub const MAX_WORDS: usize = 80;

/// What the wire shows as the guesser of a word nobody solved before the
/// round was given up. Names are alphanumeric, so this never collides.
pub const REVEALED_MARKER: &str = "_";

/// Who solved a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guesser {
    /// Nobody yet.
    Unsolved,
    /// The named player.
    Player(String),
    /// Nobody; the answer was revealed when every player gave up.
    Revealed,
}

impl Guesser {
    pub fn is_unsolved(&self) -> bool {
        matches!(self, Self::Unsolved)
    }
}

impl fmt::Display for Guesser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsolved => Ok(()),
            Self::Player(name) => f.write_str(name),
            Self::Revealed => f.write_str(REVEALED_MARKER),
        }
    }
}

/// A round's words, keyed by word, iterated in alphabetical order.
///
/// Once a word leaves [`Guesser::Unsolved`] it never returns, and a
/// solved word keeps its guesser forever.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordSet {
    words: BTreeMap<String, Guesser>,
}

impl WordSet {
    /// Parses a host's space-separated word list.
    ///
    /// Each token is 3–6 lowercase letters. A trailing `_` means the host
    /// already knows the word: it is stored as solved by `host`. Any bad
    /// token, a duplicate, or more than [`MAX_WORDS`] tokens rejects the
    /// whole list.
    ///
    /// ```rust
    /// use sixletters_protocol::{Guesser, WordSet};
    ///
    /// let words = WordSet::parse("cat dog_", "alice").unwrap();
    /// assert_eq!(words.guesser("cat"), Some(&Guesser::Unsolved));
    /// assert_eq!(words.guesser("dog"), Some(&Guesser::Player("alice".into())));
    /// ```
    pub fn parse(raw: &str, host: &str) -> Result<Self, ProtocolError> {
        let tokens: Vec<&str> = raw.split(' ').collect();
        if tokens.len() > MAX_WORDS {
            return Err(ProtocolError::TooManyWords(tokens.len()));
        }

        let mut words = BTreeMap::new();
        for token in tokens {
            let (word, guesser) = match token.strip_suffix('_') {
                Some(word) => (word, Guesser::Player(host.to_string())),
                None => (token, Guesser::Unsolved),
            };
            if !is_valid_word(word) {
                return Err(ProtocolError::MalformedWord(token.to_string()));
            }
            if words.insert(word.to_string(), guesser).is_some() {
                return Err(ProtocolError::DuplicateWord(word.to_string()));
            }
        }
        Ok(Self { words })
    }

    /// Renders the set back into host syntax: solved words get their `_`
    /// back. Revealed words render as solved as well.
    pub fn to_host_string(&self) -> String {
        self.words
            .iter()
            .map(|(word, guesser)| match guesser {
                Guesser::Unsolved => word.clone(),
                _ => format!("{word}_"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Who solved `word`, or `None` if it isn't in the set.
    pub fn guesser(&self, word: &str) -> Option<&Guesser> {
        self.words.get(word)
    }

    /// Marks `word` as solved by `name` if it is present and unsolved.
    ///
    /// Returns `false` (and changes nothing) otherwise.
    pub fn solve(&mut self, word: &str, name: &str) -> bool {
        match self.words.get_mut(word) {
            Some(guesser) if guesser.is_unsolved() => {
                *guesser = Guesser::Player(name.to_string());
                true
            }
            _ => false,
        }
    }

    /// Marks every unsolved word as revealed. Returns how many changed.
    pub fn reveal(&mut self) -> usize {
        let mut revealed = 0;
        for guesser in self.words.values_mut() {
            if guesser.is_unsolved() {
                *guesser = Guesser::Revealed;
                revealed += 1;
            }
        }
        revealed
    }

    /// Words solved by a player (revealed words don't count).
    pub fn solved_count(&self) -> usize {
        self.words
            .values()
            .filter(|g| matches!(g, Guesser::Player(_)))
            .count()
    }

    /// All words, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// All `(word, guesser)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Guesser)> {
        self.words.iter().map(|(w, g)| (w.as_str(), g))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
