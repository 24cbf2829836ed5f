//! Automatic closing of brackets and quotes.
//!
//! Typing an opening character inserts its partner and leaves the caret in
//! between. Typing a closing character right in front of the same closing
//! character steps over it instead of doubling it, as long as the line has
//! an unmatched opener.

use crate::buffer::TextBuffer;
use crate::tokenizer::is_word_char;

/// Whether a pair delimits a group or quotes text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    Bracket,
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub open: char,
    pub close: char,
    pub kind: PairKind,
}

const fn pair(open: char, close: char, kind: PairKind) -> Pair {
    Pair { open, close, kind }
}

/// Every pair handled by auto-closure.
pub const PAIRS: [Pair; 8] = [
    pair('(', ')', PairKind::Bracket),
    pair('{', '}', PairKind::Bracket),
    pair('[', ']', PairKind::Bracket),
    pair('«', '»', PairKind::Bracket),
    pair('‹', '›', PairKind::Bracket),
    pair('\'', '\'', PairKind::Quote),
    pair('`', '`', PairKind::Quote),
    pair('"', '"', PairKind::Quote),
];

/// Pair opened by `ch`, if any.
pub fn opening(ch: char) -> Option<Pair> {
    PAIRS.iter().copied().find(|p| p.open == ch)
}

/// Pair closed by `ch`, if any.
pub fn closing(ch: char) -> Option<Pair> {
    PAIRS.iter().copied().find(|p| p.close == ch)
}

/// Whether `ch` takes part in auto-closure at all.
pub fn is_pair_char(ch: char) -> bool {
    opening(ch).is_some() || closing(ch).is_some()
}

/// Apply auto-closure for a typed `ch`.
///
/// Returns `true` when the buffer was edited (or the caret moved) and the
/// key must not be inserted as typed; `false` lets the default insertion
/// happen. Quotes act as openers, so a quote in front of the same quote is
/// stepped over through the opening path.
pub fn handle(buffer: &mut TextBuffer, ch: char) -> bool {
    if let Some(pair) = opening(ch) {
        return handle_open(buffer, pair);
    }
    if let Some(pair) = closing(ch) {
        return handle_close(buffer, pair);
    }
    false
}

fn handle_open(buffer: &mut TextBuffer, pair: Pair) -> bool {
    let next = buffer.char_after_caret();
    let selection = buffer.has_selection();

    if pair.kind == PairKind::Quote
        && !selection
        && next != Some(pair.close)
        && touches_word(buffer)
    {
        // Contractions and possessives: let the quote through unpaired.
        return false;
    }

    if selection {
        let wrapped = format!("{}{}{}", pair.open, buffer.selected_text(), pair.close);
        buffer.insert(&wrapped);
        buffer.move_caret(-1);
    } else if next == Some(pair.close) {
        buffer.move_caret(1);
    } else {
        let both = format!("{}{}", pair.open, pair.close);
        buffer.insert(&both);
        buffer.move_caret(-1);
    }

    true
}

fn handle_close(buffer: &mut TextBuffer, pair: Pair) -> bool {
    if buffer.char_after_caret() != Some(pair.close) || !has_unmatched_open(buffer, pair) {
        return false;
    }

    buffer.move_caret(1);
    true
}

fn touches_word(buffer: &TextBuffer) -> bool {
    buffer.char_before_caret().is_some_and(is_word_char)
        || buffer.char_after_caret().is_some_and(is_word_char)
}

fn has_unmatched_open(buffer: &TextBuffer, pair: Pair) -> bool {
    let line = buffer.line_before_caret();
    let opens = line.chars().filter(|&c| c == pair.open).count();
    let closes = line.chars().filter(|&c| c == pair.close).count();
    opens > closes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_char(text: &str, caret: usize, ch: char) -> (bool, String, usize) {
        let mut buffer = TextBuffer::new(text);
        buffer.set_caret(caret);
        let handled = handle(&mut buffer, ch);
        (handled, buffer.text(), buffer.caret())
    }

    #[test]
    fn test_open_inserts_pair_with_caret_between() {
        assert_eq!(type_char("call", 4, '('), (true, "call()".to_string(), 5));
        assert_eq!(type_char("", 0, '{'), (true, "{}".to_string(), 1));
        assert_eq!(type_char("x ", 2, '«'), (true, "x «»".to_string(), 3));
    }

    #[test]
    fn test_open_skips_existing_close() {
        // "[" whose partner is already next: step over it.
        assert_eq!(type_char("[]", 1, '['), (true, "[]".to_string(), 2));
    }

    #[test]
    fn test_open_wraps_selection() {
        let mut buffer = TextBuffer::new("say hello now");
        buffer.select(4, 9);
        assert!(handle(&mut buffer, '"'));
        assert_eq!(buffer.text(), "say \"hello\" now");
        assert_eq!(buffer.caret(), 10);
        assert!(!buffer.has_selection());
    }

    #[test]
    fn test_quote_next_to_word_is_not_paired() {
        assert_eq!(type_char("don", 3, '\''), (false, "don".to_string(), 3));
        assert_eq!(type_char("word", 0, '"'), (false, "word".to_string(), 0));
        // Decomposed "é" ends in a combining mark, still part of the word.
        assert_eq!(
            type_char("cafe\u{301}", 5, '"'),
            (false, "cafe\u{301}".to_string(), 5)
        );
    }

    #[test]
    fn test_quote_pairs_away_from_words() {
        assert_eq!(type_char("say ", 4, '"'), (true, "say \"\"".to_string(), 5));
    }

    #[test]
    fn test_quote_steps_over_closing_quote() {
        assert_eq!(type_char("'it'", 3, '\''), (true, "'it'".to_string(), 4));
    }

    #[test]
    fn test_close_steps_over_when_unmatched() {
        assert_eq!(type_char("f(x)", 3, ')'), (true, "f(x)".to_string(), 4));
    }

    #[test]
    fn test_close_inserts_when_balanced_or_not_next() {
        assert_eq!(type_char("()x)", 3, ')'), (false, "()x)".to_string(), 3));
        assert_eq!(type_char("(x", 2, ')'), (false, "(x".to_string(), 2));
        assert_eq!(type_char("a\n(b\n)", 5, ')'), (false, "a\n(b\n)".to_string(), 5));
    }

    #[test]
    fn test_pair_lookup() {
        assert!(is_pair_char('('));
        assert!(is_pair_char(')'));
        assert!(is_pair_char('`'));
        assert!(is_pair_char('›'));
        assert!(!is_pair_char('<'));
        assert_eq!(opening('\'').map(|p| p.kind), Some(PairKind::Quote));
        assert_eq!(closing(']').map(|p| p.open), Some('['));
    }
}
