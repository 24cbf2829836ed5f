//! Editable text with a single caret or selection.
//!
//! Offsets are character indices, not bytes. Every offset handed to the
//! buffer is clamped into `0..=len` so out-of-range caret math degrades to
//! the nearest valid position instead of panicking.

use std::ops::Range;

/// The word around the caret, as found by [`TextBuffer::word_at_caret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    /// Offset of the first character of the word.
    pub start: usize,
    /// Offset one past the last character of the word.
    pub end: usize,
    pub word: String,
}

impl WordSpan {
    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }
}

/// Caret location as a zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretPosition {
    pub line: usize,
    pub column: usize,
}

/// Text storage with a selection.
///
/// When `start == end` the selection is a plain caret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    chars: Vec<char>,
    start: usize,
    end: usize,
}

impl TextBuffer {
    /// Create a buffer with the caret at the end of `text`.
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        Self {
            chars,
            start: len,
            end: len,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Number of characters in the buffer.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Replace the whole text, keeping the selection clamped to the new length.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        let (start, end) = (self.start, self.end);
        self.select(start, end);
    }

    /// Select `start..end`. Offsets are clamped and reordered.
    pub fn select(&mut self, start: usize, end: usize) {
        let start = start.min(self.len());
        let end = end.min(self.len());
        self.start = start.min(end);
        self.end = start.max(end);
    }

    /// Collapse the selection to `offset`.
    pub fn set_caret(&mut self, offset: usize) {
        self.select(offset, offset);
    }

    /// The caret, i.e. the end of the selection.
    pub fn caret(&self) -> usize {
        self.end
    }

    pub fn selection(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn has_selection(&self) -> bool {
        self.start != self.end
    }

    pub fn selected_text(&self) -> String {
        self.chars[self.start..self.end].iter().collect()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    /// Character right before the selection start.
    pub fn char_before_caret(&self) -> Option<char> {
        self.start.checked_sub(1).and_then(|i| self.char_at(i))
    }

    /// Character right after the selection end.
    pub fn char_after_caret(&self) -> Option<char> {
        self.char_at(self.end)
    }

    /// Replace the selection with `text` and put the caret after it.
    pub fn insert(&mut self, text: &str) {
        let inserted: Vec<char> = text.chars().collect();
        let caret = self.start + inserted.len();
        self.chars.splice(self.start..self.end, inserted);
        self.set_caret(caret);
    }

    /// Delete the selection, or `count` characters before the caret.
    pub fn delete_backward(&mut self, count: usize) {
        if self.has_selection() {
            self.chars.drain(self.start..self.end);
            let start = self.start;
            self.set_caret(start);
            return;
        }

        let from = self.start.saturating_sub(count);
        self.chars.drain(from..self.start);
        self.set_caret(from);
    }

    /// Collapse the selection to the caret moved by `delta` characters.
    pub fn move_caret(&mut self, delta: isize) {
        let target = self.end.saturating_add_signed(delta);
        self.set_caret(target);
    }

    fn line_start(&self, offset: usize) -> usize {
        self.chars[..offset]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.chars[offset..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(self.len(), |i| offset + i)
    }

    /// The whole line holding the selection start.
    pub fn current_line(&self) -> String {
        let from = self.line_start(self.start);
        let to = self.line_end(self.start);
        self.chars[from..to].iter().collect()
    }

    /// Text between the start of the caret's line and the caret.
    pub fn line_before_caret(&self) -> String {
        let from = self.line_start(self.start);
        self.chars[from..self.start].iter().collect()
    }

    /// Whether nothing but the line break (or the end of text) follows the caret.
    pub fn is_caret_at_end_of_line(&self) -> bool {
        self.line_end(self.start) == self.start
    }

    /// Line and column of the caret.
    pub fn caret_position(&self) -> CaretPosition {
        let caret = self.caret();
        let line = self.chars[..caret].iter().filter(|&&c| c == '\n').count();
        let column = caret - self.line_start(caret);
        CaretPosition { line, column }
    }

    /// Find the run of non-whitespace characters around the selection.
    ///
    /// Scans left from the selection start and right from the selection end.
    /// With the caret right after a space the word is empty.
    pub fn word_at_caret(&self) -> WordSpan {
        let start = self.chars[..self.start]
            .iter()
            .rposition(|c| c.is_whitespace())
            .map_or(0, |i| i + 1);
        let end = self.chars[self.end..]
            .iter()
            .position(|c| c.is_whitespace())
            .map_or(self.len(), |i| self.end + i);

        WordSpan {
            start,
            end,
            word: self.chars[start..end].iter().collect(),
        }
    }
}
