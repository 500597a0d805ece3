//! LaTeX backend.
//!
//! Emits a document body (no preamble). Strikethrough needs `ulem`, links
//! `hyperref` and task markers `amssymb`.

use crate::backend::{InlineKind, RenderBackend};

/// LaTeX render backend.
pub struct LatexBackend;

impl RenderBackend for LatexBackend {
    const RAW_HTML: bool = false;

    fn escape(text: &str, out: &mut String) {
        for c in text.chars() {
            match c {
                '\\' => out.push_str(r"\textbackslash{}"),
                '~' => out.push_str(r"\textasciitilde{}"),
                '^' => out.push_str(r"\textasciicircum{}"),
                '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
    }

    fn paragraph_start(_out: &mut String) {}

    fn paragraph_end(out: &mut String) {
        out.push_str("\n\n");
    }

    fn heading(level: u8, id: &str, content: &str, out: &mut String) {
        let command = match level {
            1 => "section",
            2 => "subsection",
            3 => "subsubsection",
            4 => "paragraph",
            _ => "subparagraph",
        };
        out.push_str(&format!("\\{command}{{{content}}}\\label{{{id}}}\n\n"));
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("\\begin{quote}\n");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("\\end{quote}\n\n");
    }

    fn list_start(start: Option<u64>, out: &mut String) {
        match start {
            Some(1) => out.push_str("\\begin{enumerate}\n"),
            Some(n) => out.push_str(&format!(
                "\\begin{{enumerate}}\n\\setcounter{{enumi}}{{{}}}\n",
                n.saturating_sub(1)
            )),
            None => out.push_str("\\begin{itemize}\n"),
        }
    }

    fn list_end(ordered: bool, out: &mut String) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(if ordered {
            "\\end{enumerate}\n\n"
        } else {
            "\\end{itemize}\n\n"
        });
    }

    fn item_start(_number: Option<u64>, _depth: usize, out: &mut String) {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\\item ");
    }

    fn item_end(out: &mut String) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    fn code_block(_lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str("\\begin{verbatim}\n");
        out.push_str(content);
        if !content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\\end{verbatim}\n\n");
    }

    fn inline_code(code: &str, out: &mut String) {
        out.push_str("\\texttt{");
        Self::escape(code, out);
        out.push('}');
    }

    fn inline_start(kind: InlineKind, out: &mut String) {
        let command = match kind {
            InlineKind::Emphasis => "emph",
            InlineKind::Strong => "textbf",
            InlineKind::Strikethrough => "sout",
            InlineKind::Superscript => "textsuperscript",
            InlineKind::Subscript => "textsubscript",
        };
        out.push('\\');
        out.push_str(command);
        out.push('{');
    }

    fn inline_end(_kind: InlineKind, out: &mut String) {
        out.push('}');
    }

    fn link_start(url: &str, out: &mut String) {
        out.push_str("\\href{");
        for c in url.chars() {
            if matches!(c, '%' | '#' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push_str("}{");
    }

    fn link_end(_url: &str, out: &mut String) {
        out.push('}');
    }

    fn image(src: &str, _alt: &str, _title: &str, out: &mut String) {
        out.push_str(&format!("\\includegraphics{{{src}}}"));
    }

    fn hard_break(out: &mut String) {
        out.push_str("\\\\\n");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("\\noindent\\rule{\\linewidth}{0.4pt}\n\n");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        out.push_str(if checked { "$\\boxtimes$ " } else { "$\\square$ " });
    }
}
