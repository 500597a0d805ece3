//! Plain text backend.
//!
//! Paragraphs are separated by blank lines, headings are underlined and
//! inline markup is kept as light punctuation (`*em*`, `**strong**`,
//! `"code"`).

use crate::backend::{InlineKind, RenderBackend};

/// Plain text render backend.
pub struct TextBackend;

impl RenderBackend for TextBackend {
    const RAW_HTML: bool = false;

    fn escape(text: &str, out: &mut String) {
        out.push_str(text);
    }

    fn paragraph_start(_out: &mut String) {}

    fn paragraph_end(out: &mut String) {
        out.push_str("\n\n");
    }

    fn heading(level: u8, _id: &str, content: &str, out: &mut String) {
        let underline = match level {
            1 => '=',
            2 => '-',
            _ => '~',
        };
        out.push_str(content);
        out.push('\n');
        out.extend(std::iter::repeat_n(underline, content.chars().count()));
        out.push_str("\n\n");
    }

    fn blockquote_start(_out: &mut String) {}

    fn blockquote_end(_out: &mut String) {}

    fn list_start(_start: Option<u64>, _out: &mut String) {}

    fn list_end(_ordered: bool, out: &mut String) {
        if !out.ends_with("\n\n") {
            out.push('\n');
        }
    }

    fn item_start(number: Option<u64>, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth.saturating_sub(1)));
        match number {
            Some(n) => out.push_str(&format!("{n}. ")),
            None => out.push_str("- "),
        }
    }

    fn item_end(out: &mut String) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    fn code_block(_lang: Option<&str>, content: &str, out: &mut String) {
        for line in content.lines() {
            if !line.is_empty() {
                out.push_str("    ");
            }
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }

    fn inline_code(code: &str, out: &mut String) {
        out.push('"');
        out.push_str(code);
        out.push('"');
    }

    fn inline_start(kind: InlineKind, out: &mut String) {
        out.push_str(mark(kind));
    }

    fn inline_end(kind: InlineKind, out: &mut String) {
        out.push_str(mark(kind));
    }

    fn link_start(_url: &str, _out: &mut String) {}

    fn link_end(url: &str, out: &mut String) {
        if !url.is_empty() && !url.starts_with('#') {
            out.push_str(&format!(" <{url}>"));
        }
    }

    fn image(_src: &str, alt: &str, _title: &str, out: &mut String) {
        out.push_str(&format!("[image: {alt}]"));
    }

    fn hard_break(out: &mut String) {
        out.push('\n');
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("----\n\n");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        out.push_str(if checked { "[x] " } else { "[ ] " });
    }

    fn finish(_title: Option<&str>, out: &mut String) {
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        if !out.is_empty() {
            out.push('\n');
        }
    }
}

fn mark(kind: InlineKind) -> &'static str {
    match kind {
        InlineKind::Emphasis => "*",
        InlineKind::Strong => "**",
        InlineKind::Strikethrough => "~~",
        InlineKind::Superscript => "^",
        InlineKind::Subscript => "_",
    }
}
