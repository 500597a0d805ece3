//! Generic markdown renderer with pluggable backend.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::backend::{InlineKind, RenderBackend};
use crate::node::NodeMarker;
use crate::registry::{DepartFn, Registry, Translator, Visit};
use crate::state::{CodeBlockState, HeadingState, ImageState, TocEntry};
use crate::util::heading_level_to_num;
use crate::{Node, OutputFormat};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered document.
    pub output: String,
    /// Title extracted from first H1 heading (if title extraction was enabled).
    pub title: Option<String>,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Warnings generated while rendering (e.g., unhandled node types).
    pub warnings: Vec<String>,
}

/// A node whose children are being rendered.
struct OpenNode {
    index: usize,
    depart: Option<DepartFn>,
}

/// Generic markdown renderer with pluggable backend.
///
/// Uses the [`RenderBackend`] trait to delegate format-specific rendering
/// while handling common elements (lists, headings, inline formatting)
/// generically.
///
/// # Nodes
///
/// Directive nodes reach the renderer as marker HTML blocks. With
/// [`with_nodes`](Self::with_nodes), each marker is dispatched to the node
/// type's handlers for the renderer's [`OutputFormat`]. A node that is skipped,
/// or has no handler for the format, is dropped along with everything between
/// its markers, nested nodes included.
pub struct MarkdownRenderer<B: RenderBackend> {
    format: OutputFormat,
    output: String,
    /// Next item number of each open list (`None` for bullet lists).
    list_stack: Vec<Option<u64>>,
    link_stack: Vec<String>,
    code: CodeBlockState,
    image: ImageState,
    heading: HeadingState,
    base_path: Option<String>,
    pending_image: Option<(String, String)>,
    registry: Option<Arc<Registry>>,
    nodes: Vec<Node>,
    open_nodes: Vec<OpenNode>,
    /// Depth of node markers inside the subtree being skipped.
    skip_depth: usize,
    unhandled: HashSet<(&'static str, OutputFormat)>,
    warnings: Vec<String>,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a renderer producing `format`.
    ///
    /// `format` is what node handlers are selected by; `B` should be the
    /// backend for it (see [`OutputFormat::backend`]).
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            output: String::with_capacity(4096),
            list_stack: Vec::new(),
            link_stack: Vec::new(),
            code: CodeBlockState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(false),
            base_path: None,
            pending_image: None,
            registry: None,
            nodes: Vec::new(),
            open_nodes: Vec::new(),
            skip_depth: 0,
            unhandled: HashSet::new(),
            warnings: Vec::new(),
            _backend: PhantomData,
        }
    }

    /// Enable title extraction from first H1 heading.
    ///
    /// The heading is still rendered but left out of the table of contents.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading.set_extract_title(true);
        self
    }

    /// Set the current page path (without extension) for resolving links.
    ///
    /// Only used by the HTML backend.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Dispatch node markers to the handlers registered in `registry`.
    ///
    /// `nodes` are the document's nodes, as returned by
    /// [`DirectiveProcessor::into_nodes`](crate::directive::DirectiveProcessor::into_nodes).
    #[must_use]
    pub fn with_nodes(mut self, registry: Arc<Registry>, nodes: Vec<Node>) -> Self {
        self.registry = Some(registry);
        self.nodes = nodes;
        self
    }

    /// Create a parser for the given markdown text.
    #[must_use]
    pub fn create_parser(markdown: &str) -> Parser<'_> {
        Parser::new_ext(
            markdown,
            Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_SUPERSCRIPT
                | Options::ENABLE_SUBSCRIPT,
        )
    }

    /// Render markdown text directly.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        self.render(Self::create_parser(markdown))
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        if !self.open_nodes.is_empty() || self.skip_depth > 0 {
            self.warnings.push(format!(
                "{} node(s) left open at end of document",
                self.open_nodes.len() + self.skip_depth
            ));
        }
        // Exit handlers still run for nodes whose closing marker never came.
        while let Some(open) = self.open_nodes.pop() {
            self.depart(&open);
        }
        self.skip_depth = 0;

        let title = self.heading.take_title();
        let mut output = std::mem::take(&mut self.output);
        B::finish(title.as_deref(), &mut output);

        RenderResult {
            output,
            title,
            toc: self.heading.take_toc(),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        if let Event::Html(html) = &event
            && let Some(marker) = NodeMarker::parse(html)
            && self.owns(marker)
        {
            self.node_marker(marker);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => {
                if B::RAW_HTML {
                    self.push_inline(&html);
                }
            }
            Event::SoftBreak => self.break_(B::soft_break),
            Event::HardBreak => self.break_(B::hard_break),
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => B::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    /// Whether `marker` was emitted for one of this document's nodes.
    fn owns(&self, marker: NodeMarker) -> bool {
        self.nodes
            .get(marker.index())
            .is_some_and(|node| node.key == marker.key())
    }

    fn node_marker(&mut self, marker: NodeMarker) {
        match marker {
            NodeMarker::Open { index, .. } => {
                if self.skip_depth > 0 {
                    self.skip_depth += 1;
                    return;
                }
                match self.visit(index) {
                    Some(depart) => self.open_nodes.push(OpenNode { index, depart }),
                    None => self.skip_depth = 1,
                }
            }
            NodeMarker::Close { .. } => {
                if self.skip_depth > 0 {
                    self.skip_depth -= 1;
                } else if let Some(open) = self.open_nodes.pop() {
                    self.depart(&open);
                } else {
                    self.warnings.push("unbalanced node end marker".to_owned());
                }
            }
        }
    }

    /// Run the enter handler of node `index`.
    ///
    /// Returns the exit handler when children are to be rendered, `None` when
    /// the node is suppressed.
    fn visit(&mut self, index: usize) -> Option<Option<DepartFn>> {
        let node = self.nodes.get(index)?;

        let handler = self
            .registry
            .as_deref()
            .and_then(|registry| registry.node_handlers(node.kind))
            .and_then(|handlers| handlers.get(self.format));
        let Some(handler) = handler else {
            if self.unhandled.insert((node.kind, self.format)) {
                tracing::debug!(node = node.kind, format = %self.format, "No handler for node type");
                self.warnings.push(format!(
                    "line {}: no handler for node type \"{}\" in format \"{}\"; node suppressed",
                    node.line, node.kind, self.format
                ));
            }
            return None;
        };

        let mut translator = Translator {
            format: self.format,
            body: &mut self.output,
        };
        match (handler.visit)(&mut translator, node) {
            Visit::Children => Some(handler.depart),
            Visit::SkipNode => None,
        }
    }

    fn depart(&mut self, open: &OpenNode) {
        let (Some(depart), Some(node)) = (open.depart, self.nodes.get(open.index)) else {
            return;
        };
        let mut translator = Translator {
            format: self.format,
            body: &mut self.output,
        };
        depart(&mut translator, node);
    }

    /// Buffer inline content goes to: the heading being built, or the output.
    fn inline_buffer(&mut self) -> &mut String {
        if self.heading.is_active() {
            self.heading.rendered_buffer()
        } else {
            &mut self.output
        }
    }

    fn push_inline(&mut self, content: &str) {
        self.inline_buffer().push_str(content);
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => B::paragraph_start(&mut self.output),
            Tag::Heading { level, .. } => {
                // Emitted in end_tag once the id is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => B::blockquote_start(&mut self.output),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => {
                self.list_stack.push(start);
                B::list_start(start, &mut self.output);
            }
            Tag::Item => {
                let depth = self.list_stack.len();
                let number = self.list_stack.last_mut().and_then(|next| {
                    let number = *next;
                    if let Some(n) = next {
                        *n += 1;
                    }
                    number
                });
                B::item_start(number, depth, &mut self.output);
            }
            Tag::Emphasis => B::inline_start(InlineKind::Emphasis, self.inline_buffer()),
            Tag::Strong => B::inline_start(InlineKind::Strong, self.inline_buffer()),
            Tag::Strikethrough => B::inline_start(InlineKind::Strikethrough, self.inline_buffer()),
            Tag::Superscript => B::inline_start(InlineKind::Superscript, self.inline_buffer()),
            Tag::Subscript => B::inline_start(InlineKind::Subscript, self.inline_buffer()),
            Tag::Link { dest_url, .. } => {
                let href = B::transform_link(&dest_url, self.base_path.as_deref()).into_owned();
                B::link_start(&href, self.inline_buffer());
                self.link_stack.push(href);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the end tag.
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => B::paragraph_end(&mut self.output),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.complete_heading() {
                    B::heading(
                        heading.level,
                        &heading.id,
                        heading.content.trim(),
                        &mut self.output,
                    );
                }
            }
            TagEnd::BlockQuote(_) => B::blockquote_end(&mut self.output),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                B::code_block(lang.as_deref(), &content, &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.list_stack.pop();
                B::list_end(ordered, &mut self.output);
            }
            TagEnd::Item => B::item_end(&mut self.output),
            TagEnd::Emphasis => B::inline_end(InlineKind::Emphasis, self.inline_buffer()),
            TagEnd::Strong => B::inline_end(InlineKind::Strong, self.inline_buffer()),
            TagEnd::Strikethrough => B::inline_end(InlineKind::Strikethrough, self.inline_buffer()),
            TagEnd::Superscript => B::inline_end(InlineKind::Superscript, self.inline_buffer()),
            TagEnd::Subscript => B::inline_end(InlineKind::Subscript, self.inline_buffer()),
            TagEnd::Link => {
                let href = self.link_stack.pop().unwrap_or_default();
                B::link_end(&href, self.inline_buffer());
            }
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    B::image(&src, &alt, &title, self.inline_buffer());
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            if self.heading.is_active() {
                self.heading.push_text(text);
            }
            B::escape(text, self.inline_buffer());
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        B::inline_code(code, self.inline_buffer());
    }

    fn break_(&mut self, render: fn(&mut String)) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.push_inline(" ");
        } else {
            render(&mut self.output);
        }
    }
}
