//! Speaker notes for reveal.js slide decks.
//!
//! Adds a `speaker` directive whose body becomes presenter-only notes:
//!
//! ```text
//! Dictionaries are cool.
//!
//! :::speaker
//! Explain this part really well!
//! :::
//! ```
//!
//! In `revealjs` output the rendered body is wrapped in
//! `<aside class='notes'>`, which reveal.js shows in its speaker view. Every
//! other output format drops the note entirely.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use glide_renderer::directive::DirectiveProcessorConfig;
//! use glide_renderer::{HtmlBackend, MarkdownRenderer, OutputFormat, Registry};
//!
//! let mut registry = Registry::new();
//! registry.setup_extension(&glide_speaker::SpeakerNotes);
//! let registry = Arc::new(registry);
//!
//! let mut processor = registry.processor(DirectiveProcessorConfig::default());
//! let markdown = processor.process(":::speaker\nSlow down here.\n:::\n").unwrap();
//!
//! let result = MarkdownRenderer::<HtmlBackend>::new(OutputFormat::RevealJs)
//!     .with_nodes(registry, processor.into_nodes())
//!     .render_markdown(&markdown);
//! assert_eq!(result.output, "<aside class='notes'><p>Slow down here.</p></aside>");
//! ```

use glide_renderer::directive::{Directive, DirectiveBlock, DirectiveError, DirectiveState};
use glide_renderer::{
    Extension, ExtensionMetadata, Node, NodeHandlers, OutputFormat, Registry, Translator, Visit,
};

/// Name of the directive (`:::speaker`).
pub const DIRECTIVE_NAME: &str = "speaker";

/// Node type produced by the directive.
pub const NODE_KIND: &str = "speakernote";

/// Emitted before the note's content in `revealjs` output.
pub const NOTES_OPEN: &str = "<aside class='notes'>";

/// Emitted after the note's content in `revealjs` output.
pub const NOTES_CLOSE: &str = "</aside>";

/// Extension version reported by [`setup`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The `speaker` directive.
///
/// Requires a body. Produces one [`NODE_KIND`] node holding the raw body,
/// registers the node's explicit name (`{#name}`) and nested-parses the body
/// so markup and directives inside the note are rendered.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpeakerNoteDirective;

impl Directive for SpeakerNoteDirective {
    fn name(&self) -> &str {
        DIRECTIVE_NAME
    }

    fn has_content(&self) -> bool {
        true
    }

    fn run(
        &self,
        block: &DirectiveBlock,
        state: &mut DirectiveState<'_>,
    ) -> Result<Vec<Node>, DirectiveError> {
        block.assert_has_content()?;

        let mut node = state.new_node(NODE_KIND, block.text());
        node.classes.extend(block.args.classes.iter().cloned());
        state.add_name(&mut node, &block.args);
        state.nested_parse(block, &mut node)?;
        Ok(vec![node])
    }
}

/// Enter handler for every format except `revealjs`: drop the note.
pub fn ignore_visit(_translator: &mut Translator<'_>, _node: &Node) -> Visit {
    Visit::SkipNode
}

/// Open the reveal.js notes aside.
pub fn revealjs_visit(translator: &mut Translator<'_>, _node: &Node) -> Visit {
    translator.body.push_str(NOTES_OPEN);
    Visit::Children
}

/// Close the aside opened by [`revealjs_visit`].
pub fn revealjs_depart(translator: &mut Translator<'_>, _node: &Node) {
    translator.body.push_str(NOTES_CLOSE);
}

/// Handlers of the [`NODE_KIND`] node for every output format.
///
/// New output formats must be listed here; until they are, the renderer
/// suppresses the note for them.
#[must_use]
pub fn handlers() -> NodeHandlers {
    NodeHandlers::new()
        .with(OutputFormat::Epub, ignore_visit, None)
        .with(OutputFormat::Html, ignore_visit, None)
        .with(OutputFormat::Handouts, ignore_visit, None)
        .with(OutputFormat::Latex, ignore_visit, None)
        .with(
            OutputFormat::RevealJs,
            revealjs_visit,
            Some(revealjs_depart),
        )
        .with(OutputFormat::Text, ignore_visit, None)
        .with(OutputFormat::Man, ignore_visit, None)
}

/// Register the directive and its node type.
pub fn setup(registry: &mut Registry) -> ExtensionMetadata {
    registry.add_node(NODE_KIND, handlers());
    registry.add_directive(SpeakerNoteDirective);
    tracing::debug!(directive = DIRECTIVE_NAME, node = NODE_KIND, "Registered speaker notes");
    ExtensionMetadata {
        version: VERSION,
        parallel_read_safe: true,
    }
}

/// Speaker notes as a loadable extension, named `speaker`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpeakerNotes;

impl Extension for SpeakerNotes {
    fn name(&self) -> &str {
        DIRECTIVE_NAME
    }

    fn setup(&self, registry: &mut Registry) -> ExtensionMetadata {
        setup(registry)
    }
}

#[cfg(test)]
mod tests {
    use glide_renderer::directive::DirectiveProcessor;
    use pretty_assertions::assert_eq;

    use super::*;

    fn node() -> Node {
        let mut processor = DirectiveProcessor::new().with_directive(SpeakerNoteDirective);
        processor.process(":::speaker\nnote\n:::\n").unwrap();
        processor.into_nodes().remove(0)
    }

    #[test]
    fn test_every_format_has_handlers() {
        let handlers = handlers();
        assert_eq!(handlers.missing().count(), 0);

        for format in OutputFormat::ALL {
            let handler = handlers.get(format).unwrap();
            assert_eq!(
                handler.depart.is_some(),
                format == OutputFormat::RevealJs,
                "{format}"
            );
        }
    }

    #[test]
    fn test_revealjs_handlers_wrap_body() {
        let node = node();
        let mut body = String::from("<p>before</p>");
        let mut translator = Translator {
            format: OutputFormat::RevealJs,
            body: &mut body,
        };

        assert_eq!(revealjs_visit(&mut translator, &node), Visit::Children);
        translator.body.push_str("<p>note</p>");
        revealjs_depart(&mut translator, &node);

        assert_eq!(
            body,
            "<p>before</p><aside class='notes'><p>note</p></aside>"
        );
    }

    #[test]
    fn test_ignore_visit_emits_nothing() {
        let node = node();
        let mut body = String::new();
        let mut translator = Translator {
            format: OutputFormat::Latex,
            body: &mut body,
        };

        assert_eq!(ignore_visit(&mut translator, &node), Visit::SkipNode);
        assert!(body.is_empty());
    }

    #[test]
    fn test_directive_builds_node() {
        let mut processor = DirectiveProcessor::new().with_directive(SpeakerNoteDirective);
        processor
            .process("Intro.\n\n:::speaker{#why-dicts .long}\nExplain *this*.\n\nAnd that.\n:::\n")
            .unwrap();

        let nodes = processor.nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].kind, NODE_KIND);
        assert_eq!(nodes[0].id, "speakernote-0");
        assert_eq!(nodes[0].text, "Explain *this*.\n\nAnd that.");
        assert_eq!(nodes[0].names, ["why-dicts"]);
        assert_eq!(nodes[0].classes, ["long"]);
        assert_eq!(nodes[0].line, 3);
    }

    #[test]
    fn test_empty_body_is_an_error() {
        let mut processor = DirectiveProcessor::new().with_directive(SpeakerNoteDirective);
        let err = processor.process("Intro.\n\n:::speaker\n\n:::\n").unwrap_err();

        assert_eq!(
            err,
            DirectiveError::ContentRequired {
                directive: DIRECTIVE_NAME.to_owned(),
                line: 3,
            }
        );
        assert_eq!(
            err.to_string(),
            "line 3: Content block expected for the \"speaker\" directive; none found."
        );
    }

    #[test]
    fn test_setup_metadata() {
        let mut registry = Registry::new();
        let metadata = setup(&mut registry);

        assert_eq!(
            metadata,
            ExtensionMetadata {
                version: VERSION,
                parallel_read_safe: true,
            }
        );
        assert!(registry.directive(DIRECTIVE_NAME).is_some());
        assert!(registry.node_handlers(NODE_KIND).is_some());
    }
}
