//! Render backend trait for format-specific rendering.
//!
//! The renderer walks pulldown-cmark events and tracks document state
//! (headings, lists, images, nodes); everything that depends on the target
//! syntax goes through a [`RenderBackend`].

use std::borrow::Cow;

/// Inline span kinds with a start and an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineKind {
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
}

/// Backend trait for format-specific rendering operations.
///
/// All operations append to `out`. Text reaching the backend is unescaped;
/// [`escape`](Self::escape) is responsible for the target's quoting rules.
pub trait RenderBackend {
    /// Whether raw HTML in the source is copied to the output.
    const RAW_HTML: bool;

    /// Append `text` with the target's special characters escaped.
    fn escape(text: &str, out: &mut String);

    /// Render paragraph start.
    fn paragraph_start(out: &mut String);

    /// Render paragraph end.
    fn paragraph_end(out: &mut String);

    /// Render a heading.
    ///
    /// * `level` - Heading level (1-6)
    /// * `id` - Unique anchor id
    /// * `content` - Already rendered inline content
    fn heading(level: u8, id: &str, content: &str, out: &mut String);

    /// Render blockquote start.
    fn blockquote_start(out: &mut String);

    /// Render blockquote end.
    fn blockquote_end(out: &mut String);

    /// Render list start. `start` is the first number of an ordered list.
    fn list_start(start: Option<u64>, out: &mut String);

    /// Render list end.
    fn list_end(ordered: bool, out: &mut String);

    /// Render list item start.
    ///
    /// * `number` - Item number in an ordered list, `None` for bullets
    /// * `depth` - List nesting depth, starting at 1
    fn item_start(number: Option<u64>, depth: usize, out: &mut String);

    /// Render list item end.
    fn item_end(out: &mut String);

    /// Render a code block.
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "python")
    /// * `content` - The code content, unescaped
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render inline code.
    fn inline_code(code: &str, out: &mut String);

    /// Render the start of an inline span.
    fn inline_start(kind: InlineKind, out: &mut String);

    /// Render the end of an inline span.
    fn inline_end(kind: InlineKind, out: &mut String);

    /// Render link start.
    fn link_start(url: &str, out: &mut String);

    /// Render link end.
    fn link_end(url: &str, out: &mut String);

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a soft break.
    fn soft_break(out: &mut String) {
        out.push('\n');
    }

    /// Render a hard break.
    fn hard_break(out: &mut String);

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String);

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String);

    /// Transform a link URL.
    ///
    /// Default implementation returns the URL unchanged.
    #[must_use]
    fn transform_link<'a>(url: &'a str, _base_path: Option<&str>) -> Cow<'a, str> {
        Cow::Borrowed(url)
    }

    /// Finish the document once all events are rendered.
    fn finish(_title: Option<&str>, _out: &mut String) {}
}
