//! Directive argument parsing.
//!
//! Handles the `[label]{#name .class key="value"}` tail of a directive line.

use std::collections::BTreeMap;

/// Arguments written after a directive name.
///
/// # Example
///
/// ```
/// use glide_renderer::directive::DirectiveArgs;
///
/// let args = DirectiveArgs::parse("Intro", r#"#intro-note .muted timing="30s""#);
/// assert_eq!(args.label, "Intro");
/// assert_eq!(args.id.as_deref(), Some("intro-note"));
/// assert_eq!(args.classes, vec!["muted"]);
/// assert_eq!(args.get("timing"), Some("30s"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Text between brackets (empty when absent).
    pub label: String,
    /// `#id` attribute.
    pub id: Option<String>,
    /// `.class` attributes in source order.
    pub classes: Vec<String>,
    /// `key=value` attributes.
    pub attrs: BTreeMap<String, String>,
}

impl DirectiveArgs {
    /// Parse a label and the inside of an attribute block (without braces).
    #[must_use]
    pub fn parse(label: &str, attrs: &str) -> Self {
        let mut args = Self {
            label: label.trim().to_owned(),
            ..Self::default()
        };

        let mut rest = attrs.trim_start();
        while let Some(first) = rest.chars().next() {
            rest = match first {
                '#' => {
                    let (word, tail) = split_word(&rest[1..]);
                    if !word.is_empty() {
                        args.id = Some(word.to_owned());
                    }
                    tail
                }
                '.' => {
                    let (word, tail) = split_word(&rest[1..]);
                    if !word.is_empty() {
                        args.classes.push(word.to_owned());
                    }
                    tail
                }
                c if c.is_whitespace() => rest.trim_start(),
                _ => match split_key_value(rest) {
                    Some((key, value, tail)) => {
                        args.attrs.insert(key.to_owned(), value.to_owned());
                        tail
                    }
                    None => &rest[first.len_utf8()..],
                },
            };
        }

        args
    }

    /// Look up a `key=value` attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Explicit name for cross-referencing: `#id`, or a `name=` attribute.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.id.as_deref().or_else(|| self.get("name"))
    }

    /// Write the arguments back in directive syntax.
    ///
    /// Used when a directive line is passed through untouched.
    #[must_use]
    pub fn to_syntax(&self) -> String {
        let mut out = String::new();
        if !self.label.is_empty() {
            out.push('[');
            out.push_str(&self.label);
            out.push(']');
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(id) = &self.id {
            parts.push(format!("#{id}"));
        }
        parts.extend(self.classes.iter().map(|c| format!(".{c}")));
        parts.extend(
            self.attrs
                .iter()
                .map(|(k, v)| format!(r#"{k}="{}""#, v.replace('"', "\\\""))),
        );

        if !parts.is_empty() {
            out.push('{');
            out.push_str(&parts.join(" "));
            out.push('}');
        }
        out
    }
}

/// Split an id or class word off the front; words end at whitespace, `.` or `#`.
fn split_word(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Split `key="v"`, `key='v'` or `key=v` off the front.
fn split_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq = s.find('=')?;
    let key = s[..eq].trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let value = &s[eq + 1..];
    match value.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let inner = &value[1..];
            let close = inner.find(quote)?;
            Some((key, &inner[..close], &inner[close + 1..]))
        }
        _ => {
            let end = value.find(char::is_whitespace).unwrap_or(value.len());
            Some((key, &value[..end], &value[end..]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(DirectiveArgs::parse("", ""), DirectiveArgs::default());
    }

    #[test]
    fn test_label_is_trimmed() {
        let args = DirectiveArgs::parse("  Opening remarks ", "");
        assert_eq!(args.label, "Opening remarks");
    }

    #[test]
    fn test_id_and_compact_classes() {
        let args = DirectiveArgs::parse("", "#intro.a.b");
        assert_eq!(args.id.as_deref(), Some("intro"));
        assert_eq!(args.classes, vec!["a", "b"]);
    }

    #[test]
    fn test_quoted_and_bare_values() {
        let args = DirectiveArgs::parse("", r#"title="Two words" who='me' n=3"#);
        assert_eq!(args.get("title"), Some("Two words"));
        assert_eq!(args.get("who"), Some("me"));
        assert_eq!(args.get("n"), Some("3"));
        assert_eq!(args.get("missing"), None);
    }

    #[test]
    fn test_unterminated_quote_is_skipped() {
        let args = DirectiveArgs::parse("", r#"title="oops .cls"#);
        assert_eq!(args.get("title"), None);
    }

    #[test]
    fn test_name_prefers_id_over_attribute() {
        assert_eq!(DirectiveArgs::parse("", "#a name=b").name(), Some("a"));
        assert_eq!(DirectiveArgs::parse("", "name=b").name(), Some("b"));
        assert_eq!(DirectiveArgs::parse("", ".c").name(), None);
    }

    #[test]
    fn test_to_syntax() {
        assert_eq!(DirectiveArgs::default().to_syntax(), "");
        assert_eq!(DirectiveArgs::parse("x", "").to_syntax(), "[x]");
        assert_eq!(
            DirectiveArgs::parse("x", r#"lang=en .c #i"#).to_syntax(),
            r#"[x]{#i .c lang="en"}"#
        );
    }
}
