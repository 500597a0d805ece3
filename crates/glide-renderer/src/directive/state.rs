//! Per-occurrence view of the processor handed to [`Directive::run`](super::Directive::run).

use super::{DirectiveArgs, DirectiveBlock, DirectiveContext, DirectiveError, DirectiveProcessor};
use crate::Node;

/// Document state available to a running directive.
///
/// Borrowed from the document's [`DirectiveProcessor`], so everything a
/// directive records here (ids, names, warnings) is scoped to one document.
pub struct DirectiveState<'a> {
    pub(super) processor: &'a mut DirectiveProcessor,
    pub(super) depth: usize,
    pub(super) line: usize,
}

impl DirectiveState<'_> {
    /// Source location of the directive being run.
    #[must_use]
    pub fn context(&self) -> DirectiveContext<'_> {
        DirectiveContext {
            source_path: self.processor.config.source_path.as_deref(),
            line: self.line,
        }
    }

    /// Create a node with a generated id, unique within the document.
    pub fn new_node(&mut self, kind: &'static str, text: impl Into<String>) -> Node {
        let count = self.processor.kind_counts.entry(kind).or_default();
        let id = format!("{kind}-{count}");
        *count += 1;
        Node::new(kind, id, text.into(), self.line)
    }

    /// Register the explicit name given in the directive's arguments.
    ///
    /// Names are normalized (lowercase, whitespace collapsed). A name already
    /// used in this document is kept on the node and reported as a warning.
    pub fn add_name(&mut self, node: &mut Node, args: &DirectiveArgs) {
        let Some(raw) = args.name() else {
            return;
        };
        let name = normalize_name(raw);
        if name.is_empty() {
            return;
        }
        if !self.processor.names.insert(name.clone()) {
            self.warn(format!("duplicate explicit target name \"{name}\""));
        }
        node.names.push(name);
    }

    /// Expand the block's body as markup and attach it to `node`.
    ///
    /// Directives inside the body are run too. Past the configured nesting
    /// depth the body is attached unexpanded and a warning is recorded.
    pub fn nested_parse(
        &mut self,
        block: &DirectiveBlock,
        node: &mut Node,
    ) -> Result<(), DirectiveError> {
        let depth = self.depth + 1;
        let max = self.processor.config.max_nesting_depth;
        if depth > max {
            self.warn(format!("maximum directive nesting depth ({max}) exceeded"));
            node.body = block.text();
            return Ok(());
        }
        node.body = self
            .processor
            .expand(&block.text(), depth, block.content_offset())?;
        Ok(())
    }

    /// Record a warning at the directive's location.
    pub fn warn(&mut self, message: impl AsRef<str>) {
        let location = self.context().location();
        self.processor
            .warnings
            .push(format!("{location}: {}", message.as_ref()));
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
