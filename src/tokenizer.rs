//! Word tokenizer for the prediction model.
//!
//! A token is a maximal run of word characters: letters, digits, underscore,
//! apostrophe and hyphen. Everything else (whitespace, punctuation, brackets)
//! separates tokens. Tokens keep their original casing; the model decides
//! where case matters.
//!
//! ```rust
//! use noteassist::tokenizer::tokenize;
//!
//! let tokens = tokenize("Don't stop - re-read it!").unwrap();
//! assert_eq!(tokens, vec!["Don't", "stop", "-", "re-read", "it"]);
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Pattern for a single token.
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w'-]+").expect("word pattern is valid"));

/// Split `text` into word tokens, left to right.
///
/// Returns `None` when the text holds no token at all. Callers treat that as
/// "no model can be built" rather than as an error.
pub fn tokenize(text: &str) -> Option<Vec<&str>> {
    let tokens: Vec<&str> = WORD_PATTERN.find_iter(text).map(|m| m.as_str()).collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

/// Whether `ch` belongs to a token, by the same character class [`tokenize`]
/// uses, so combining marks and connector punctuation count too.
pub fn is_word_char(ch: char) -> bool {
    WORD_PATTERN.is_match(ch.encode_utf8(&mut [0; 4]))
}
