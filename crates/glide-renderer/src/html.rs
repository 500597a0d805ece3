//! HTML backend for markdown rendering.
//!
//! Produces semantic HTML5. Used by the `html`, `handouts`, `revealjs` and
//! `epub` formats.

use std::borrow::Cow;

use crate::backend::{InlineKind, RenderBackend};
use crate::state::escape_html;
use crate::util::relative_path;

/// HTML render backend.
///
/// Produces semantic HTML5 with:
/// - `<pre><code>` for code blocks
/// - `<blockquote>` for blockquotes
/// - `<img>` for images
/// - `.md` links rewritten to the built `.html` pages
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    const RAW_HTML: bool = true;

    fn escape(text: &str, out: &mut String) {
        out.push_str(&escape_html(text));
    }

    fn paragraph_start(out: &mut String) {
        out.push_str("<p>");
    }

    fn paragraph_end(out: &mut String) {
        out.push_str("</p>");
    }

    fn heading(level: u8, id: &str, content: &str, out: &mut String) {
        out.push_str(&format!(
            r#"<h{level} id="{}">{content}</h{level}>"#,
            escape_html(id)
        ));
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn list_start(start: Option<u64>, out: &mut String) {
        match start {
            Some(1) => out.push_str("<ol>"),
            Some(n) => out.push_str(&format!(r#"<ol start="{n}">"#)),
            None => out.push_str("<ul>"),
        }
    }

    fn list_end(ordered: bool, out: &mut String) {
        out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }

    fn item_start(_number: Option<u64>, _depth: usize, out: &mut String) {
        out.push_str("<li>");
    }

    fn item_end(out: &mut String) {
        out.push_str("</li>");
    }

    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        match lang {
            Some(lang) => out.push_str(&format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )),
            None => out.push_str(&format!("<pre><code>{}</code></pre>", escape_html(content))),
        }
    }

    fn inline_code(code: &str, out: &mut String) {
        out.push_str("<code>");
        out.push_str(&escape_html(code));
        out.push_str("</code>");
    }

    fn inline_start(kind: InlineKind, out: &mut String) {
        out.push('<');
        out.push_str(tag(kind));
        out.push('>');
    }

    fn inline_end(kind: InlineKind, out: &mut String) {
        out.push_str("</");
        out.push_str(tag(kind));
        out.push('>');
    }

    fn link_start(url: &str, out: &mut String) {
        out.push_str(&format!(r#"<a href="{}">"#, escape_html(url)));
    }

    fn link_end(_url: &str, out: &mut String) {
        out.push_str("</a>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        out.push_str(&format!(
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        ));
    }

    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }

    fn transform_link<'a>(url: &'a str, base_path: Option<&str>) -> Cow<'a, str> {
        resolve_link(url, base_path)
    }
}

fn tag(kind: InlineKind) -> &'static str {
    match kind {
        InlineKind::Emphasis => "em",
        InlineKind::Strong => "strong",
        InlineKind::Strikethrough => "del",
        InlineKind::Superscript => "sup",
        InlineKind::Subscript => "sub",
    }
}

/// Rewrite a markdown link to the page built from it.
///
/// - `sibling.md` → `sibling.html`
/// - `guide/index.md#setup` → `guide/index.html#setup`
/// - `/talks/intro.md` → relative to `base_path` (the current page), e.g.
///   `../talks/intro.html`
///
/// External links, fragment-only links, and non-markdown links are returned unchanged.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
fn resolve_link<'a>(url: &'a str, base_path: Option<&str>) -> Cow<'a, str> {
    if url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with('#')
    {
        return Cow::Borrowed(url);
    }

    let (path, fragment) = match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    };
    let Some(stem) = path.strip_suffix(".md") else {
        return Cow::Borrowed(url);
    };

    let target = match (stem.strip_prefix('/'), base_path) {
        (Some(absolute), Some(base)) => relative_path(base, absolute),
        _ => stem.to_string(),
    };
    Cow::Owned(format!("{target}.html{fragment}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("python"), "x = {'a': 1}", &mut out);
        assert_eq!(
            out,
            r#"<pre><code class="language-python">x = {&#x27;a&#x27;: 1}</code></pre>"#
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let mut out = String::new();
        HtmlBackend::code_block(None, "plain <code>", &mut out);
        assert_eq!(out, "<pre><code>plain &lt;code&gt;</code></pre>");
    }

    #[test]
    fn test_heading() {
        let mut out = String::new();
        HtmlBackend::heading(2, "dictionaries", "<em>Dictionaries</em>", &mut out);
        assert_eq!(out, r#"<h2 id="dictionaries"><em>Dictionaries</em></h2>"#);
    }

    #[test]
    fn test_ordered_list_start() {
        let mut out = String::new();
        HtmlBackend::list_start(Some(3), &mut out);
        HtmlBackend::item_start(Some(3), 1, &mut out);
        HtmlBackend::item_end(&mut out);
        HtmlBackend::list_end(true, &mut out);
        assert_eq!(out, r#"<ol start="3"><li></li></ol>"#);
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        HtmlBackend::image("map.png", "A map", "The \"map\"", &mut out);
        assert_eq!(
            out,
            r#"<img src="map.png" title="The &quot;map&quot;" alt="A map">"#
        );
    }

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(resolve_link("dicts.md", None), "dicts.html");
        assert_eq!(
            resolve_link("../basics/lists.md#slicing", Some("talks/dicts")),
            "../basics/lists.html#slicing"
        );
    }

    #[test]
    fn test_resolve_absolute_link() {
        assert_eq!(
            resolve_link("/basics/lists.md", Some("talks/dicts")),
            "../basics/lists.html"
        );
        assert_eq!(resolve_link("/basics/lists.md", None), "/basics/lists.html");
    }

    #[test]
    fn test_resolve_leaves_other_links() {
        assert_eq!(resolve_link("https://example.com/a.md", None), "https://example.com/a.md");
        assert_eq!(resolve_link("#section", None), "#section");
        assert_eq!(resolve_link("image.png", None), "image.png");
        assert!(matches!(resolve_link("notes.txt", None), Cow::Borrowed(_)));
    }
}
