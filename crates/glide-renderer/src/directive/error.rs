//! Directive authoring errors.

/// Error raised by a directive while expanding a document.
///
/// These are authoring errors: they fail the build of the document that
/// contains the directive and are reported with its source line.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// The directive requires a nested content block but none was given.
    #[error("line {line}: Content block expected for the \"{directive}\" directive; none found.")]
    ContentRequired {
        /// Directive name.
        directive: String,
        /// Line of the directive tag (1-indexed).
        line: usize,
    },
    /// The directive takes no content but a block was given.
    #[error("line {line}: no content permitted for the \"{directive}\" directive")]
    UnexpectedContent {
        /// Directive name.
        directive: String,
        /// Line of the directive tag (1-indexed).
        line: usize,
    },
}

impl DirectiveError {
    /// Source line the error refers to.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::ContentRequired { line, .. } | Self::UnexpectedContent { line, .. } => *line,
        }
    }
}
