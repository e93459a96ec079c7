//! Text codec: decoding player commands and validating the small
//! vocabulary of names, words, and codes the protocol accepts.
//!
//! Encoding is the `Display` impl on [`ServerLine`](crate::ServerLine);
//! this module covers the other direction.

use crate::ClientCommand;

/// Longest display name a player may choose.
pub const MAX_NAME_LEN: usize = 10;

const MIN_WORD_LEN: usize = 3;
const MAX_WORD_LEN: usize = 6;

const MIN_CODE_LEN: usize = 5;
const MAX_CODE_LEN: usize = 16;
const MAX_PREFIX_LEN: usize = MAX_CODE_LEN - MIN_CODE_LEN;

/// Decodes one frame from a joined player.
///
/// Returns `None` for anything that isn't a well-formed command. Callers
/// ignore such frames rather than treating them as errors.
///
/// ```rust
/// use sixletters_protocol::{decode_command, ClientCommand};
///
/// assert_eq!(
///     decode_command(":attempt cat"),
///     Some(ClientCommand::Attempt("cat".into()))
/// );
/// assert_eq!(decode_command(":giveup"), Some(ClientCommand::GiveUp));
/// assert_eq!(decode_command("hello"), None);
/// ```
pub fn decode_command(text: &str) -> Option<ClientCommand> {
    match text {
        ":giveup" => Some(ClientCommand::GiveUp),
        ":ungiveup" => Some(ClientCommand::UnGiveUp),
        _ => {
            let word = text.strip_prefix(":attempt ")?;
            is_valid_word(word).then(|| ClientCommand::Attempt(word.to_string()))
        }
    }
}

/// A word is 3–6 lowercase ASCII letters.
pub fn is_valid_word(word: &str) -> bool {
    (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&word.len())
        && word.bytes().all(|b| b.is_ascii_lowercase())
}

/// A display name is 1–10 ASCII letters or digits.
pub fn is_valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A round code, as it appears in a join route: 5–16 ASCII letters or
/// digits (the generated part plus any deployment prefix).
pub fn is_valid_code(code: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A deployment prefix is empty or lowercase letters and digits, short
/// enough that prefixed codes still pass [`is_valid_code`].
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() <= MAX_PREFIX_LEN
        && prefix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
