//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Compute a relative URL from one page to another.
///
/// Both `from` and `to` are page paths without leading slash. The last
/// segment of `from` is the current document; its base directory is
/// everything before it.
///
/// # Examples
///
/// ```
/// use glide_renderer::relative_path;
///
/// assert_eq!(relative_path("slides/intro", "slides/dicts"), "dicts");
/// assert_eq!(relative_path("slides/intro", "index"), "../index");
/// assert_eq!(relative_path("", "slides/intro"), "slides/intro");
/// ```
#[must_use]
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    // A trailing slash means `from` is itself a directory.
    let from_dir = match from_segs.split_last() {
        Some((_, dir)) if !from.ends_with('/') => dir,
        _ => &from_segs[..],
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let result = format!(
        "{}{}",
        "../".repeat(from_dir.len() - common),
        to_segs[common..].join("/")
    );
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
