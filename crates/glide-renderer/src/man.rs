//! Man page backend (roff with the `man` macros).

use crate::backend::{InlineKind, RenderBackend};

/// Man page render backend.
pub struct ManBackend;

impl RenderBackend for ManBackend {
    const RAW_HTML: bool = false;

    fn escape(text: &str, out: &mut String) {
        for (i, c) in text.chars().enumerate() {
            // A control character at the start of a line would be read as a request.
            if i == 0 && matches!(c, '.' | '\'') && (out.is_empty() || out.ends_with('\n')) {
                out.push_str("\\&");
            }
            match c {
                '\\' => out.push_str("\\e"),
                '-' => out.push_str("\\-"),
                _ => out.push(c),
            }
        }
    }

    fn paragraph_start(out: &mut String) {
        out.push_str(".PP\n");
    }

    fn paragraph_end(out: &mut String) {
        out.push('\n');
    }

    fn heading(level: u8, _id: &str, content: &str, out: &mut String) {
        let macro_name = if level <= 1 { ".SH" } else { ".SS" };
        out.push_str(&format!("{macro_name} \"{}\"\n", content.replace('"', "\\(dq")));
    }

    fn blockquote_start(out: &mut String) {
        out.push_str(".RS\n");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str(".RE\n");
    }

    fn list_start(_start: Option<u64>, _out: &mut String) {}

    fn list_end(_ordered: bool, _out: &mut String) {}

    fn item_start(number: Option<u64>, _depth: usize, out: &mut String) {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        match number {
            Some(n) => out.push_str(&format!(".IP {n}. 4\n")),
            None => out.push_str(".IP \\(bu 2\n"),
        }
    }

    fn item_end(out: &mut String) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    fn code_block(_lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str(".PP\n.nf\n");
        for line in content.lines() {
            Self::escape(line, out);
            out.push('\n');
        }
        out.push_str(".fi\n");
    }

    fn inline_code(code: &str, out: &mut String) {
        out.push_str("\\fB");
        Self::escape(code, out);
        out.push_str("\\fP");
    }

    fn inline_start(kind: InlineKind, out: &mut String) {
        match kind {
            InlineKind::Emphasis => out.push_str("\\fI"),
            InlineKind::Strong => out.push_str("\\fB"),
            InlineKind::Strikethrough | InlineKind::Superscript | InlineKind::Subscript => {}
        }
    }

    fn inline_end(kind: InlineKind, out: &mut String) {
        if matches!(kind, InlineKind::Emphasis | InlineKind::Strong) {
            out.push_str("\\fP");
        }
    }

    fn link_start(_url: &str, _out: &mut String) {}

    fn link_end(url: &str, out: &mut String) {
        if !url.is_empty() && !url.starts_with('#') {
            out.push_str(" \\(la");
            Self::escape(url, out);
            out.push_str("\\(ra");
        }
    }

    fn image(_src: &str, alt: &str, _title: &str, out: &mut String) {
        out.push_str("[image: ");
        Self::escape(alt, out);
        out.push(']');
    }

    fn hard_break(out: &mut String) {
        out.push_str("\n.br\n");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str(".sp\n");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        out.push_str(if checked { "[x] " } else { "[ ] " });
    }

    /// Prepend the `.TH` title line.
    fn finish(title: Option<&str>, out: &mut String) {
        let title = title.unwrap_or("untitled").to_uppercase().replace('"', "\\(dq");
        out.insert_str(0, &format!(".TH \"{title}\" 1\n"));
    }
}
