//! Source location handed to directives.

use std::path::Path;

/// Where a directive appears.
#[derive(Clone, Copy, Debug)]
pub struct DirectiveContext<'a> {
    /// Source document being expanded (if known).
    pub source_path: Option<&'a Path>,
    /// Line of the directive tag (1-indexed).
    pub line: usize,
}

impl DirectiveContext<'_> {
    /// `path:line` for log messages, or `line N` without a path.
    #[must_use]
    pub fn location(&self) -> String {
        match self.source_path {
            Some(path) => format!("{}:{}", path.display(), self.line),
            None => format!("line {}", self.line),
        }
    }
}
