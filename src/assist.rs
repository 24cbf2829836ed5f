//! Keystroke handling for the editor.
//!
//! Each key press is mapped to an [`EditCommand`] by [`EditCommand::from_key`],
//! which also applies the preference flags, then executed against the text
//! buffer by [`apply`]. A command either consumes the key
//! ([`KeyOutcome::Handled`]) or leaves it to the default editing behaviour
//! ([`KeyOutcome::Default`]).
//!
//! ```text
//! Key ──from_key(prefs)──▶ EditCommand ──apply──▶ Handled | Default
//!                           ├─ Tab            accept suggestion / outdent / indent
//!                           ├─ Enter          list continuation
//!                           └─ Pair(ch)       bracket & quote closure
//! ```

use url::Url;

use crate::buffer::{CaretPosition, TextBuffer};
use crate::closure;
use crate::list;
use crate::preferences::Preferences;

/// A key press as delivered by the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    Enter,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false };
    pub const SHIFT: Self = Self { shift: true };
}

/// Commands the editing assist knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    /// Accept the suggestion, or indent/outdent.
    Tab { shift: bool },
    /// Continue or end a list.
    ContinueList,
    /// Auto-close or step over a bracket or quote.
    Pair(char),
}

impl EditCommand {
    /// Select the command for `key`, if any assist is active for it.
    pub fn from_key(key: Key, modifiers: Modifiers, prefs: &Preferences) -> Option<Self> {
        match key {
            Key::Tab => Some(EditCommand::Tab {
                shift: modifiers.shift,
            }),
            Key::Enter if prefs.auto_list => Some(EditCommand::ContinueList),
            Key::Char(ch) if prefs.auto_closure && closure::is_pair_char(ch) => {
                Some(EditCommand::Pair(ch))
            }
            _ => None,
        }
    }
}

/// What happened to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The assist edited the buffer; the key must not be applied again.
    Handled,
    /// The key should have its ordinary effect.
    Default,
}

impl KeyOutcome {
    fn from_handled(handled: bool) -> Self {
        if handled {
            KeyOutcome::Handled
        } else {
            KeyOutcome::Default
        }
    }
}

/// Run `command` against `buffer`.
///
/// `suggestion` is the completion currently on display; Tab inserts it.
pub fn apply(
    command: EditCommand,
    buffer: &mut TextBuffer,
    suggestion: Option<&str>,
) -> KeyOutcome {
    match command {
        EditCommand::Tab { shift } => {
            handle_tab(buffer, suggestion, shift);
            KeyOutcome::Handled
        }
        EditCommand::ContinueList => KeyOutcome::from_handled(list::handle_enter(buffer)),
        EditCommand::Pair(ch) => KeyOutcome::from_handled(closure::handle(buffer, ch)),
    }
}

fn handle_tab(buffer: &mut TextBuffer, suggestion: Option<&str>, shift: bool) {
    if let Some(text) = suggestion.filter(|s| !s.is_empty()) {
        buffer.insert(text);
    } else if shift {
        if buffer.char_before_caret() == Some('\t') {
            buffer.delete_backward(1);
        }
    } else {
        buffer.insert("\t");
    }
}

/// The ordinary effect of `key` on `buffer`.
pub fn apply_default(key: Key, buffer: &mut TextBuffer) {
    match key {
        Key::Tab => buffer.insert("\t"),
        Key::Enter => buffer.insert("\n"),
        Key::Backspace => buffer.delete_backward(1),
        Key::Char(ch) => buffer.insert(ch.encode_utf8(&mut [0; 4])),
    }
}

/// Whether `text` parses as an absolute URL.
pub fn is_valid_url(text: &str) -> bool {
    !text.is_empty() && Url::parse(text).is_ok()
}

/// Select the URL under the caret for a context menu.
///
/// Does nothing when text is already selected or the word under the caret
/// is not a URL. Returns whether a selection was made.
pub fn select_url_at_caret(buffer: &mut TextBuffer) -> bool {
    if buffer.has_selection() {
        return false;
    }

    let span = buffer.word_at_caret();
    if !is_valid_url(&span.word) {
        return false;
    }

    buffer.select(span.start, span.end);
    true
}

/// Pixel metrics of the editing surface's font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub line_height: f32,
    pub char_width: f32,
}

/// Where a suggestion is drawn, relative to the top-left of the text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionPosition {
    pub top: f32,
    pub left: f32,
}

impl SuggestionPosition {
    pub fn at_caret(caret: CaretPosition, metrics: TextMetrics) -> Self {
        Self {
            top: caret.line as f32 * metrics.line_height,
            left: caret.column as f32 * metrics.char_width,
        }
    }
}

/// A completion shown next to the caret.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Text inserted on accept, a space followed by the predicted word.
    pub text: String,
    /// The predicted word alone.
    pub word: String,
    pub position: SuggestionPosition,
}

impl Suggestion {
    pub fn new(word: &str, position: SuggestionPosition) -> Self {
        Self {
            text: format!(" {word}"),
            word: word.to_string(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        text: &str,
        key: Key,
        modifiers: Modifiers,
        suggestion: Option<&str>,
    ) -> (KeyOutcome, String) {
        let mut buffer = TextBuffer::new(text);
        let outcome = match EditCommand::from_key(key, modifiers, &Preferences::default()) {
            Some(command) => apply(command, &mut buffer, suggestion),
            None => KeyOutcome::Default,
        };
        (outcome, buffer.text())
    }

    #[test]
    fn test_tab_accepts_suggestion() {
        assert_eq!(
            run("the", Key::Tab, Modifiers::NONE, Some(" cat")),
            (KeyOutcome::Handled, "the cat".to_string())
        );
        // Shift does not block accepting.
        assert_eq!(
            run("the", Key::Tab, Modifiers::SHIFT, Some(" cat")),
            (KeyOutcome::Handled, "the cat".to_string())
        );
    }

    #[test]
    fn test_tab_indents_and_shift_tab_outdents() {
        assert_eq!(
            run("a", Key::Tab, Modifiers::NONE, None),
            (KeyOutcome::Handled, "a\t".to_string())
        );
        assert_eq!(
            run("a", Key::Tab, Modifiers::NONE, Some("")),
            (KeyOutcome::Handled, "a\t".to_string())
        );
        assert_eq!(
            run("a\t", Key::Tab, Modifiers::SHIFT, None),
            (KeyOutcome::Handled, "a".to_string())
        );
        assert_eq!(
            run("ab", Key::Tab, Modifiers::SHIFT, None),
            (KeyOutcome::Handled, "ab".to_string())
        );
    }

    #[test]
    fn test_dispatch_respects_preferences() {
        let off = Preferences {
            auto_closure: false,
            auto_list: false,
            ..Preferences::default()
        };
        assert_eq!(EditCommand::from_key(Key::Char('('), Modifiers::NONE, &off), None);
        assert_eq!(EditCommand::from_key(Key::Enter, Modifiers::NONE, &off), None);
        assert_eq!(
            EditCommand::from_key(Key::Tab, Modifiers::NONE, &off),
            Some(EditCommand::Tab { shift: false })
        );

        let on = Preferences::default();
        assert_eq!(
            EditCommand::from_key(Key::Char('('), Modifiers::NONE, &on),
            Some(EditCommand::Pair('('))
        );
        assert_eq!(EditCommand::from_key(Key::Char('a'), Modifiers::NONE, &on), None);
        assert_eq!(EditCommand::from_key(Key::Backspace, Modifiers::NONE, &on), None);
    }

    #[test]
    fn test_enter_and_pairs_through_dispatch() {
        assert_eq!(
            run("1. item", Key::Enter, Modifiers::NONE, None),
            (KeyOutcome::Handled, "1. item\n2. ".to_string())
        );
        assert_eq!(
            run("plain", Key::Enter, Modifiers::NONE, None),
            (KeyOutcome::Default, "plain".to_string())
        );
        assert_eq!(
            run("f", Key::Char('('), Modifiers::NONE, None),
            (KeyOutcome::Handled, "f()".to_string())
        );
    }

    #[test]
    fn test_apply_default() {
        let mut buffer = TextBuffer::new("ab");
        apply_default(Key::Char('é'), &mut buffer);
        apply_default(Key::Enter, &mut buffer);
        apply_default(Key::Tab, &mut buffer);
        assert_eq!(buffer.text(), "abé\n\t");
        apply_default(Key::Backspace, &mut buffer);
        assert_eq!(buffer.text(), "abé\n");
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/path?q=1"));
        assert!(is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_context_menu_selects_url() {
        let mut buffer = TextBuffer::new("read https://example.com/doc today");
        buffer.set_caret(10);
        assert!(select_url_at_caret(&mut buffer));
        assert_eq!(buffer.selected_text(), "https://example.com/doc");

        // An existing selection is left alone.
        buffer.select(0, 4);
        assert!(!select_url_at_caret(&mut buffer));
        assert_eq!(buffer.selected_text(), "read");

        let mut buffer = TextBuffer::new("plain words only");
        buffer.set_caret(2);
        assert!(!select_url_at_caret(&mut buffer));
        assert!(!buffer.has_selection());
    }

    #[test]
    fn test_suggestion_position() {
        let metrics = TextMetrics {
            line_height: 20.0,
            char_width: 8.0,
        };
        let suggestion = Suggestion::new(
            "cat",
            SuggestionPosition::at_caret(CaretPosition { line: 2, column: 5 }, metrics),
        );
        assert_eq!(suggestion.text, " cat");
        assert_eq!(suggestion.position, SuggestionPosition { top: 40.0, left: 40.0 });
    }
}
