//! Container directive line syntax: `:::name[label]{attrs}` and `:::`.

use super::DirectiveArgs;

/// A line that opens or closes a container directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ContainerLine {
    /// `:::name[label]{attrs}`
    Open { name: String, args: DirectiveArgs },
    /// A line of three or more colons.
    Close { colons: usize },
}

/// Classify a line as a container opener or closer.
///
/// Leading and trailing whitespace is ignored. Returns `None` for any other
/// line, including an opener whose name is not a valid directive name.
pub(crate) fn parse_container_line(line: &str) -> Option<ContainerLine> {
    let trimmed = line.trim();
    let colons = trimmed.chars().take_while(|&c| c == ':').count();
    if colons < 3 {
        return None;
    }

    let rest = trimmed[colons..].trim_start();
    if rest.is_empty() {
        return Some(ContainerLine::Close { colons });
    }

    let name_end = rest
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(rest.len());
    let (name, tail) = rest.split_at(name_end);
    if !is_valid_name(name) {
        return None;
    }

    let (label, tail) = take_delimited(tail, '[', ']');
    let (attrs, _) = take_delimited(tail, '{', '}');

    Some(ContainerLine::Open {
        name: name.to_owned(),
        args: DirectiveArgs::parse(label, attrs),
    })
}

/// Directive names are alphanumerics, `-` and `_`.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Take a balanced `open ... close` group from the front of `s`.
///
/// Returns the inner text and the remainder. An absent or unbalanced group
/// yields an empty inner text and leaves `s` untouched.
fn take_delimited(s: &str, open: char, close: char) -> (&str, &str) {
    if !s.starts_with(open) {
        return ("", s);
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return (&s[open.len_utf8()..i], &s[i + close.len_utf8()..]);
            }
        }
    }
    ("", s)
}
