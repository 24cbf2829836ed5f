//! List continuation on Enter.
//!
//! Three kinds of list line are recognised, checked in this order:
//!
//! | kind      | example       | next line   |
//! |-----------|---------------|-------------|
//! | checklist | `- [x] done`  | `- [ ] `    |
//! | unordered | `* item`      | `* `        |
//! | ordered   | `  9. item`   | `  10. `    |
//!
//! A marker with nothing after it ends the list: the marker is removed
//! instead of being repeated.

use regex::Regex;
use std::sync::LazyLock;

use crate::buffer::TextBuffer;

static CHECKLIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((\s*[-*+] \[[ xX]\]) )(.*)$").expect("checklist pattern is valid")
});
static UNORDERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((\s*[-*+]) )(.*)$").expect("unordered list pattern is valid")
});
static ORDERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((\s*)(\d+)\. )(.*)$").expect("ordered list pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Checklist,
    Unordered,
    Ordered,
}

/// A list marker found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub kind: ListKind,
    /// The full marker including its trailing space, e.g. `"  3. "`.
    pub marker: String,
    /// Marker for the following item, e.g. `"  4. "`.
    pub next_marker: String,
    /// Whatever follows the marker.
    pub content: String,
}

/// Recognise a list marker at the start of `line`.
pub fn parse(line: &str) -> Option<ListItem> {
    if let Some(caps) = CHECKLIST.captures(line) {
        return Some(ListItem {
            kind: ListKind::Checklist,
            marker: caps[1].to_string(),
            next_marker: format!("{} ", caps[2].replace(|c: char| c == 'x' || c == 'X', " ")),
            content: caps[3].to_string(),
        });
    }

    if let Some(caps) = UNORDERED.captures(line) {
        return Some(ListItem {
            kind: ListKind::Unordered,
            marker: caps[1].to_string(),
            next_marker: format!("{} ", &caps[2]),
            content: caps[3].to_string(),
        });
    }

    let caps = ORDERED.captures(line)?;
    // Digits too long for u64 are left alone.
    let number: u64 = caps[3].parse().ok()?;
    Some(ListItem {
        kind: ListKind::Ordered,
        marker: caps[1].to_string(),
        next_marker: format!("{}{}. ", &caps[2], number.saturating_add(1)),
        content: caps[4].to_string(),
    })
}

/// Continue or end the list the caret is in.
///
/// Looks at the text between the start of the caret's line and the caret.
/// Returns `false` when that text is not a list item, in which case the
/// caller performs a plain line break. A selection is replaced by the new
/// item, never treated as an empty one.
pub fn handle_enter(buffer: &mut TextBuffer) -> bool {
    let Some(item) = parse(&buffer.line_before_caret()) else {
        return false;
    };

    if item.content.is_empty() && !buffer.has_selection() {
        buffer.delete_backward(item.marker.chars().count());
    } else {
        buffer.insert(&format!("\n{}", item.next_marker));
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enter(text: &str) -> (bool, String) {
        let mut buffer = TextBuffer::new(text);
        let handled = handle_enter(&mut buffer);
        (handled, buffer.text())
    }

    #[test]
    fn test_ordered_list_increments() {
        assert_eq!(enter("1. item"), (true, "1. item\n2. ".to_string()));
        assert_eq!(enter("intro\n  9. nine"), (true, "intro\n  9. nine\n  10. ".to_string()));
    }

    #[test]
    fn test_empty_item_removes_marker() {
        assert_eq!(enter("1. "), (true, String::new()));
        assert_eq!(enter("a\n- "), (true, "a\n".to_string()));
        assert_eq!(enter("- [x] "), (true, String::new()));
    }

    #[test]
    fn test_selection_is_replaced_by_next_item() {
        let mut buffer = TextBuffer::new("1. abc");
        buffer.select(3, 6);
        assert!(handle_enter(&mut buffer));
        assert_eq!(buffer.text(), "1. \n2. ");
        assert_eq!(buffer.caret(), 7);

        let mut buffer = TextBuffer::new("- milk and eggs");
        buffer.select(7, 15);
        assert!(handle_enter(&mut buffer));
        assert_eq!(buffer.text(), "- milk \n- ");
    }

    #[test]
    fn test_unordered_list_repeats_marker() {
        assert_eq!(enter("- milk"), (true, "- milk\n- ".to_string()));
        assert_eq!(enter("  * eggs"), (true, "  * eggs\n  * ".to_string()));
    }

    #[test]
    fn test_checklist_resets_checkbox() {
        assert_eq!(enter("- [x] done"), (true, "- [x] done\n- [ ] ".to_string()));
        assert_eq!(enter("- [ ] todo"), (true, "- [ ] todo\n- [ ] ".to_string()));
    }

    #[test]
    fn test_plain_lines_are_left_alone() {
        assert_eq!(enter("just text"), (false, "just text".to_string()));
        assert_eq!(enter("-dash"), (false, "-dash".to_string()));
        assert_eq!(enter("1.5 apples"), (false, "1.5 apples".to_string()));
        assert_eq!(enter(""), (false, String::new()));
    }

    #[test]
    fn test_only_text_before_caret_counts() {
        let mut buffer = TextBuffer::new("- first half");
        buffer.set_caret(8);
        assert!(handle_enter(&mut buffer));
        assert_eq!(buffer.text(), "- first \n- half");
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse("- [ ] a").unwrap().kind, ListKind::Checklist);
        assert_eq!(parse("- [ a").unwrap().kind, ListKind::Unordered);
        assert_eq!(parse("12. a").unwrap().kind, ListKind::Ordered);
        assert!(parse("a. b").is_none());
    }
}
