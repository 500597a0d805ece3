//! Container directive trait.
//!
//! Container directives use triple-colon syntax: `:::name` ... `:::`

use super::{DirectiveArgs, DirectiveError, DirectiveState};
use crate::Node;

/// One occurrence of a container directive, with its body collected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveBlock {
    /// Directive name as written.
    pub name: String,
    /// `[label]{attrs}` from the opening line.
    pub args: DirectiveArgs,
    /// Body lines between the opening line and its closing `:::`.
    pub content: Vec<String>,
    /// Line of the opening tag (1-indexed).
    pub line: usize,
}

impl DirectiveBlock {
    /// Whether the body has any non-blank line.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content.iter().any(|l| !l.trim().is_empty())
    }

    /// Fail with [`DirectiveError::ContentRequired`] when the body is empty.
    pub fn assert_has_content(&self) -> Result<(), DirectiveError> {
        if self.has_content() {
            Ok(())
        } else {
            Err(DirectiveError::ContentRequired {
                directive: self.name.clone(),
                line: self.line,
            })
        }
    }

    /// Body joined with newlines, verbatim.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.join("\n")
    }

    /// Line of the first body line.
    #[must_use]
    pub fn content_offset(&self) -> usize {
        self.line + 1
    }
}

/// Handler for a container directive.
///
/// A directive is registered once and shared by every document of a build,
/// possibly across threads, so it is `Send + Sync` and takes `&self`.
/// Per-document state (node ids, names, warnings) lives in the
/// [`DirectiveState`] passed to [`run`](Self::run).
///
/// # Example
///
/// ```
/// use glide_renderer::directive::{
///     Directive, DirectiveBlock, DirectiveError, DirectiveProcessor, DirectiveState,
/// };
/// use glide_renderer::Node;
///
/// struct Aside;
///
/// impl Directive for Aside {
///     fn name(&self) -> &str { "aside" }
///
///     fn has_content(&self) -> bool { true }
///
///     fn run(
///         &self,
///         block: &DirectiveBlock,
///         state: &mut DirectiveState<'_>,
///     ) -> Result<Vec<Node>, DirectiveError> {
///         block.assert_has_content()?;
///         let mut node = state.new_node("aside", block.text());
///         state.nested_parse(block, &mut node)?;
///         Ok(vec![node])
///     }
/// }
///
/// let mut processor = DirectiveProcessor::new().with_directive(Aside);
/// let out = processor.process(":::aside\nHello *there*\n:::").unwrap();
/// assert!(out.contains(r#"<glide-node data-id="0" data-key=""#));
/// assert!(out.contains("Hello *there*"));
/// assert_eq!(processor.nodes()[0].id, "aside-0");
/// ```
pub trait Directive: Send + Sync {
    /// Directive name matched against `:::name`.
    fn name(&self) -> &str;

    /// Whether the directive accepts a body.
    ///
    /// A body given to a directive that does not accept one is an error.
    fn has_content(&self) -> bool {
        false
    }

    /// Expand one occurrence into nodes.
    fn run(
        &self,
        block: &DirectiveBlock,
        state: &mut DirectiveState<'_>,
    ) -> Result<Vec<Node>, DirectiveError>;
}
