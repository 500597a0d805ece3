//! Block context of markdown lines: code, list items and block quotes.
//!
//! Directive lines are only recognized outside code, and a directive written
//! inside a list item or block quote is expanded back into it.

use super::fence::FenceTracker;

/// Indentation, in columns, past the enclosing block that starts indented code.
const CODE_INDENT: usize = 4;

/// Line-by-line block state of one markdown fragment.
#[derive(Debug)]
pub(crate) struct BlockTracker {
    fence: FenceTracker,
    indented_code: bool,
    after_blank: bool,
    /// Content columns of the open list items, innermost last.
    lists: Vec<usize>,
}

impl BlockTracker {
    pub(crate) fn new() -> Self {
        Self {
            fence: FenceTracker::new(),
            indented_code: false,
            after_blank: true,
            lists: Vec::new(),
        }
    }

    /// Feed one line. Returns `true` when the line is code and stays literal.
    pub(crate) fn is_literal(&mut self, line: &str) -> bool {
        if self.fence.in_fence() {
            self.fence.update(line);
            return true;
        }
        if line.trim().is_empty() {
            self.after_blank = true;
            return self.indented_code;
        }

        let indent = indent_width(line);
        let after_blank = std::mem::replace(&mut self.after_blank, false);
        // Indented code cannot interrupt a paragraph.
        if indent >= self.list_indent() + CODE_INDENT && (self.indented_code || after_blank) {
            self.indented_code = true;
            return true;
        }
        self.indented_code = false;

        if let Some((_, content)) = list_item(line) {
            self.lists.retain(|&column| column <= indent);
            self.lists.push(content);
        } else if after_blank {
            self.lists.retain(|&column| column <= indent);
        }
        self.fence.update(line)
    }

    /// Record that a block ending in a blank line was emitted.
    pub(crate) fn after_block(&mut self) {
        self.after_blank = true;
        self.indented_code = false;
    }

    /// Content column of the innermost open list item, or 0.
    pub(crate) fn list_indent(&self) -> usize {
        self.lists.last().copied().unwrap_or(0)
    }

    /// Content column of the innermost list item a line indented by
    /// `indent` columns belongs to, or 0.
    pub(crate) fn container_indent(&self, indent: usize) -> usize {
        self.lists
            .iter()
            .rev()
            .find(|&&column| column <= indent)
            .copied()
            .unwrap_or(0)
    }
}

/// Leading whitespace of `line` in columns, tabs stopping at multiples of 4.
pub(crate) fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// Remove up to `columns` columns of leading whitespace.
pub(crate) fn strip_indent(line: &str, columns: usize) -> &str {
    let mut width = 0;
    for (i, c) in line.char_indices() {
        if width >= columns {
            return &line[i..];
        }
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => return &line[i..],
        }
    }
    ""
}

/// Byte length of a block quote marker (`>` and one optional space) when
/// `line` starts one, allowing up to `max_indent` leading spaces.
pub(crate) fn quote_prefix(line: &str, max_indent: usize) -> Option<usize> {
    let rest = line.trim_start_matches(' ');
    let spaces = line.len() - rest.len();
    if spaces > max_indent || !rest.starts_with('>') {
        return None;
    }
    Some(spaces + 1 + usize::from(rest[1..].starts_with(' ')))
}

/// List item marker at the start of `line`.
///
/// Returns the byte offset and the column of the item's content.
pub(crate) fn list_item(line: &str) -> Option<(usize, usize)> {
    let indent = indent_width(line);
    let rest = line.trim_start();
    if is_thematic_break(rest) {
        return None;
    }

    let marker = if rest.starts_with(['-', '*', '+']) {
        1
    } else {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || digits > 9 || !rest[digits..].starts_with(['.', ')']) {
            return None;
        }
        digits + 1
    };

    let after = &rest[marker..];
    let offset = line.len() - after.len();
    if after.trim().is_empty() {
        return Some((line.len(), indent + marker + 1));
    }
    let spaces = after.len() - after.trim_start_matches(' ').len();
    match spaces {
        0 => None,
        // Five or more spaces start indented code inside the item.
        1..=4 => Some((offset + spaces, indent + marker + spaces)),
        _ => Some((offset + 1, indent + marker + 1)),
    }
}

fn is_thematic_break(rest: &str) -> bool {
    let marks: Vec<char> = rest.chars().filter(|c| !c.is_whitespace()).collect();
    marks.len() >= 3 && matches!(marks[0], '-' | '*' | '_') && marks.iter().all(|&c| c == marks[0])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn literal_lines(input: &str) -> Vec<bool> {
        let mut blocks = BlockTracker::new();
        input.lines().map(|line| blocks.is_literal(line)).collect()
    }

    #[test]
    fn test_indented_code_after_blank_line() {
        assert_eq!(
            literal_lines("Syntax:\n\n    :::note\n    Body.\n\n    :::\nAfter."),
            [false, false, true, true, true, true, false]
        );
    }

    #[test]
    fn test_indented_line_continues_paragraph() {
        assert_eq!(literal_lines("Para\n    :::note"), [false, false]);
    }

    #[test]
    fn test_list_content_is_not_code() {
        assert_eq!(
            literal_lines("- item\n\n    :::note\n\n      code\n"),
            [false, false, false, false, true]
        );
    }

    #[test]
    fn test_list_ends_at_unindented_paragraph() {
        let mut blocks = BlockTracker::new();
        for line in ["1. one", "   more", ""] {
            blocks.is_literal(line);
        }
        assert_eq!(blocks.list_indent(), 3);

        blocks.is_literal("Outside.");
        blocks.is_literal("");
        assert_eq!(blocks.list_indent(), 0);
        assert!(blocks.is_literal("    code"));
    }

    #[test]
    fn test_fences_are_literal() {
        assert_eq!(literal_lines("```\n:::note\n```\n:::note"), [true, true, true, false]);
    }

    #[test]
    fn test_container_indent() {
        let mut blocks = BlockTracker::new();
        blocks.is_literal("- outer");
        blocks.is_literal("  - inner");
        assert_eq!(blocks.container_indent(4), 4);
        assert_eq!(blocks.container_indent(3), 2);
        assert_eq!(blocks.container_indent(1), 0);
    }

    #[test]
    fn test_list_item() {
        assert_eq!(list_item("- a"), Some((2, 2)));
        assert_eq!(list_item("  10. a"), Some((6, 6)));
        assert_eq!(list_item("*   a"), Some((4, 4)));
        assert_eq!(list_item("-"), Some((1, 2)));
        assert_eq!(list_item("-a"), None);
        assert_eq!(list_item("- - -"), None);
        assert_eq!(list_item(":::note"), None);
    }

    #[test]
    fn test_quote_prefix() {
        assert_eq!(quote_prefix("> a", 3), Some(2));
        assert_eq!(quote_prefix(">a", 3), Some(1));
        assert_eq!(quote_prefix("   > a", 3), Some(5));
        assert_eq!(quote_prefix("    > a", 3), None);
        assert_eq!(quote_prefix("a > b", 3), None);
    }

    #[test]
    fn test_indent_helpers() {
        assert_eq!(indent_width("\t x"), 5);
        assert_eq!(strip_indent("    x", 2), "  x");
        assert_eq!(strip_indent(" x", 4), "x");
        assert_eq!(strip_indent("  ", 4), "");
    }
}
