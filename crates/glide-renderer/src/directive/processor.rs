//! Directive expansion for one document.
//!
//! Runs before pulldown-cmark: container directives are located line by line,
//! their bodies collected and the registered [`Directive`] run. Each returned
//! node is emitted as its nested-parsed body between node markers.
//!
//! Lines inside code blocks are never directives. A directive inside a block
//! quote or list item is expanded in place, keeping the quote markers or the
//! item's indentation on every emitted line.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use super::args::DirectiveArgs;
use super::layout::{BlockTracker, indent_width, list_item, quote_prefix, strip_indent};
use super::parser::{ContainerLine, parse_container_line};
use super::{Directive, DirectiveBlock, DirectiveContext, DirectiveError, DirectiveState};
use crate::Node;
use crate::node::{marker_key, wrap_node};

/// Configuration for the directive processor.
#[derive(Clone, Debug)]
pub struct DirectiveProcessorConfig {
    /// Source document being expanded (for messages).
    pub source_path: Option<PathBuf>,
    /// Maximum depth of directives nested inside directive bodies.
    ///
    /// Default: 10
    pub max_nesting_depth: usize,
}

impl Default for DirectiveProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessorConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source_path: None,
            max_nesting_depth: 10,
        }
    }

    /// Set the source file path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

/// Expands container directives in one document.
///
/// Create one processor per document: it owns the document's nodes, the id
/// counters and the set of explicit names. Directives themselves are shared.
///
/// Unknown directives and their closing lines pass through unchanged. An
/// unclosed directive takes the rest of the input as its body, and a stray
/// closing line is kept as text; both are reported in [`warnings`](Self::warnings).
pub struct DirectiveProcessor {
    pub(super) config: DirectiveProcessorConfig,
    directives: HashMap<String, Arc<dyn Directive>>,
    nodes: Vec<Node>,
    pub(super) kind_counts: HashMap<&'static str, usize>,
    pub(super) names: HashSet<String>,
    pub(super) warnings: Vec<String>,
    /// Marker key of the document being processed.
    key: u64,
}

impl Default for DirectiveProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessor {
    /// Create a processor with default configuration and no directives.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DirectiveProcessorConfig::default())
    }

    /// Create a processor with custom configuration.
    #[must_use]
    pub fn with_config(config: DirectiveProcessorConfig) -> Self {
        Self {
            config,
            directives: HashMap::new(),
            nodes: Vec::new(),
            kind_counts: HashMap::new(),
            names: HashSet::new(),
            warnings: Vec::new(),
            key: 0,
        }
    }

    /// Register a directive. A directive with the same name is replaced.
    #[must_use]
    pub fn with_directive<D: Directive + 'static>(self, directive: D) -> Self {
        self.with_shared_directive(Arc::new(directive))
    }

    /// Register a directive shared with other processors.
    #[must_use]
    pub fn with_shared_directive(mut self, directive: Arc<dyn Directive>) -> Self {
        self.directives
            .insert(directive.name().to_owned(), directive);
        self
    }

    /// Expand every directive in `input`.
    ///
    /// The first directive error aborts the expansion.
    pub fn process(&mut self, input: &str) -> Result<String, DirectiveError> {
        self.key = marker_key(input);
        self.expand(input, 0, 1)
    }

    /// Nodes created so far, indexed by the markers in the output.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Consume the processor, keeping its nodes for rendering.
    #[must_use]
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Warnings recorded while expanding.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(super) fn expand(
        &mut self,
        input: &str,
        depth: usize,
        first_line: usize,
    ) -> Result<String, DirectiveError> {
        let lines: Vec<&str> = input.lines().collect();
        let mut output = String::with_capacity(input.len());
        let mut blocks = BlockTracker::new();
        // Openers of unknown directives whose closing line must pass through too.
        let mut passthrough = 0usize;
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];
            let line_num = first_line + idx;

            if blocks.is_literal(line) {
                push_line(&mut output, line);
                idx += 1;
                continue;
            }

            let quote_indent = blocks.list_indent() + 3;
            if let Some(prefix) = quote_prefix(line, quote_indent) {
                let run = lines[idx..]
                    .iter()
                    .take_while(|l| quote_prefix(l, quote_indent).is_some())
                    .count();
                let quoted = &lines[idx..idx + run];
                self.expand_quote(quoted, &line[..prefix], quote_indent, depth, line_num, &mut output)?;
                idx += run;
                continue;
            }
            idx += 1;

            let opener = match parse_container_line(line) {
                Some(ContainerLine::Open { name, args }) => Some(Opener {
                    name,
                    args,
                    marker: "",
                    indent: indent_width(line),
                }),
                Some(ContainerLine::Close { .. }) => {
                    if passthrough > 0 {
                        passthrough -= 1;
                    } else {
                        self.warnings.push(format!(
                            "{}: stray ::: with no opening directive",
                            self.location(line_num)
                        ));
                    }
                    push_line(&mut output, line);
                    continue;
                }
                None => item_opener(line).filter(|o| self.directives.contains_key(&o.name)),
            };
            let Some(opener) = opener else {
                self.warn_misplaced(line, line_num);
                push_line(&mut output, line);
                continue;
            };
            let Some(directive) = self.directives.get(&opener.name).cloned() else {
                passthrough += 1;
                push_line(&mut output, line);
                continue;
            };

            let body = collect_body(&lines[idx..], opener.indent);
            idx += body.consumed;
            if !body.closed {
                self.warnings.push(format!(
                    "{}: unclosed container directive :::{} (missing closing :::)",
                    self.location(line_num),
                    opener.name
                ));
            }

            let block = DirectiveBlock {
                name: opener.name,
                args: opener.args,
                content: body.lines,
                line: line_num,
            };
            let mut wrapped = String::new();
            self.run_directive(directive.as_ref(), &block, depth, &mut wrapped)?;
            if opener.marker.is_empty() {
                let indent = blocks.container_indent(opener.indent);
                push_indented(&mut output, &wrapped, "", indent);
            } else {
                // The first marker takes the place of the item's opening line.
                push_indented(
                    &mut output,
                    wrapped.trim_start_matches('\n'),
                    opener.marker,
                    opener.indent,
                );
            }
            blocks.after_block();
        }

        Ok(output)
    }

    /// Expand a run of block quote lines and quote the result again.
    fn expand_quote(
        &mut self,
        lines: &[&str],
        prefix: &str,
        max_indent: usize,
        depth: usize,
        first_line: usize,
        output: &mut String,
    ) -> Result<(), DirectiveError> {
        if !lines.iter().any(|line| line.contains(":::")) {
            for line in lines {
                push_line(output, line);
            }
            return Ok(());
        }

        let inner = lines
            .iter()
            .map(|line| match quote_prefix(line, max_indent) {
                Some(len) => &line[len..],
                None => *line,
            })
            .collect::<Vec<_>>()
            .join("\n");
        let expanded = self.expand(&inner, depth, first_line)?;
        for line in expanded.lines() {
            if line.trim().is_empty() {
                output.push_str(prefix.trim_end());
            } else {
                output.push_str(prefix);
                output.push_str(line);
            }
            output.push('\n');
        }
        Ok(())
    }

    /// Warn about a known directive written where it cannot be expanded.
    fn warn_misplaced(&mut self, line: &str, line_num: usize) {
        let Some(pos) = line.find(":::") else {
            return;
        };
        let (lead, rest) = line.split_at(pos);
        if !lead.chars().all(|c| c.is_ascii_digit() || " \t>-*+.)".contains(c)) {
            return;
        }
        if let Some(ContainerLine::Open { name, .. }) = parse_container_line(rest)
            && self.directives.contains_key(&name)
        {
            self.warnings.push(format!(
                "{}: :::{name} is not expanded at this position and is kept as text",
                self.location(line_num)
            ));
        }
    }

    fn run_directive(
        &mut self,
        directive: &dyn Directive,
        block: &DirectiveBlock,
        depth: usize,
        output: &mut String,
    ) -> Result<(), DirectiveError> {
        if !directive.has_content() && block.has_content() {
            return Err(DirectiveError::UnexpectedContent {
                directive: block.name.clone(),
                line: block.line,
            });
        }

        let nodes = directive.run(
            block,
            &mut DirectiveState {
                processor: self,
                depth,
                line: block.line,
            },
        )?;

        tracing::trace!(
            directive = %block.name,
            line = block.line,
            nodes = nodes.len(),
            "Expanded directive"
        );

        for mut node in nodes {
            node.key = self.key;
            wrap_node(self.nodes.len(), self.key, node.body(), output);
            self.nodes.push(node);
        }
        Ok(())
    }

    fn location(&self, line: usize) -> String {
        DirectiveContext {
            source_path: self.config.source_path.as_deref(),
            line,
        }
        .location()
    }
}

/// A container opening line.
struct Opener<'a> {
    name: String,
    args: DirectiveArgs,
    /// List item marker written before the directive, if any.
    marker: &'a str,
    /// Indentation of the body, in columns.
    indent: usize,
}

/// Container opener written on a list item's marker line, e.g. `- :::name`.
fn item_opener(line: &str) -> Option<Opener<'_>> {
    let (offset, column) = list_item(line)?;
    match parse_container_line(&line[offset..])? {
        ContainerLine::Open { name, args } => Some(Opener {
            name,
            args,
            marker: &line[..offset],
            indent: column,
        }),
        ContainerLine::Close { .. } => None,
    }
}

/// Body of a container directive.
struct Body {
    lines: Vec<String>,
    /// Lines consumed, including the closing line.
    consumed: usize,
    closed: bool,
}

/// Collect lines up to the closing line matching an already-read opener.
///
/// `indent` columns of leading whitespace are removed from every line. Nested
/// openers (known or not) are balanced against closers, and code is taken
/// verbatim.
fn collect_body(lines: &[&str], indent: usize) -> Body {
    let mut blocks = BlockTracker::new();
    let mut depth = 1usize;
    let mut body = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line = strip_indent(line, indent);
        if !blocks.is_literal(line) {
            match parse_container_line(line) {
                Some(ContainerLine::Open { .. }) => depth += 1,
                Some(ContainerLine::Close { .. }) => {
                    depth -= 1;
                    if depth == 0 {
                        return Body {
                            lines: body,
                            consumed: idx + 1,
                            closed: true,
                        };
                    }
                }
                None if item_opener(line).is_some() => depth += 1,
                None => {}
            }
        }
        body.push(line.to_owned());
    }

    Body {
        lines: body,
        consumed: lines.len(),
        closed: false,
    }
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}

/// Push `text` line by line, the first line after `first` when given and
/// every other non-blank line indented by `indent` columns.
fn push_indented(output: &mut String, text: &str, first: &str, indent: usize) {
    for (idx, line) in text.lines().enumerate() {
        if idx == 0 && !first.is_empty() {
            output.push_str(first);
        } else if !line.is_empty() {
            output.extend(std::iter::repeat_n(' ', indent));
        }
        push_line(output, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveBlock;

    /// Wraps its body in a node and nested-parses it.
    struct TestNote;

    impl Directive for TestNote {
        fn name(&self) -> &'static str {
            "note"
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
            let mut node = state.new_node("note", block.text());
            state.add_name(&mut node, &block.args);
            state.nested_parse(block, &mut node)?;
            Ok(vec![node])
        }
    }

    /// Takes no content and produces one empty node.
    struct TestBreak;

    impl Directive for TestBreak {
        fn name(&self) -> &'static str {
            "pagebreak"
        }

        fn run(
            &self,
            _block: &DirectiveBlock,
            state: &mut DirectiveState<'_>,
        ) -> Result<Vec<Node>, DirectiveError> {
            Ok(vec![state.new_node("pagebreak", "")])
        }
    }

    fn processor() -> DirectiveProcessor {
        DirectiveProcessor::new()
            .with_directive(TestNote)
            .with_directive(TestBreak)
    }

    #[test]
    fn test_container_becomes_node() {
        let mut processor = processor();
        let output = processor
            .process("Intro.\n\n:::note\nBody *text*\n:::\nAfter.")
            .unwrap();

        let key = format!("{:016x}", processor.key);
        assert!(output.starts_with(&format!(
            "Intro.\n\n\n<glide-node data-id=\"0\" data-key=\"{key}\">\n\nBody *text*\n\n\
             <glide-node-end data-id=\"0\" data-key=\"{key}\">\n\n"
        )));
        assert!(output.ends_with("After.\n"));
        assert_eq!(processor.nodes().len(), 1);
        assert_eq!(processor.nodes()[0].text, "Body *text*");
        assert_eq!(processor.nodes()[0].line, 3);
        assert!(processor.warnings().is_empty());
    }

    #[test]
    fn test_empty_body_is_an_error() {
        let mut processor = processor();
        let err = processor.process("Intro.\n\n:::note\n\n:::").unwrap_err();
        assert_eq!(
            err,
            DirectiveError::ContentRequired {
                directive: "note".to_owned(),
                line: 3,
            }
        );
    }

    #[test]
    fn test_unexpected_content_is_an_error() {
        let mut processor = processor();
        let err = processor.process(":::pagebreak\ntext\n:::").unwrap_err();
        assert!(matches!(err, DirectiveError::UnexpectedContent { line: 1, .. }));

        let mut processor = self::processor();
        assert!(processor.process(":::pagebreak\n:::").is_ok());
    }

    #[test]
    fn test_nested_directives_are_expanded() {
        let mut processor = processor();
        let output = processor
            .process(":::note\nOuter\n\n:::note\nInner\n:::\n:::")
            .unwrap();

        // Inner node is created first, during the outer node's nested parse.
        let nodes = processor.nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text, "Inner");
        assert_eq!(nodes[0].line, 4);
        assert_eq!(nodes[1].text, "Outer\n\n:::note\nInner\n:::");
        assert!(nodes[1].body().contains("<glide-node data-id=\"0\" "));
        assert!(output.contains("<glide-node data-id=\"1\" "));
        assert!(nodes.iter().all(|node| node.key == processor.key));
    }

    #[test]
    fn test_nesting_depth_limit() {
        let config = DirectiveProcessorConfig::new().with_max_nesting_depth(1);
        let mut processor = DirectiveProcessor::with_config(config).with_directive(TestNote);

        processor
            .process(":::note\nA\n:::note\nB\n:::note\nC\n:::\n:::\n:::")
            .unwrap();

        assert!(
            processor
                .warnings()
                .iter()
                .any(|w| w.contains("maximum directive nesting depth (1)"))
        );
    }

    #[test]
    fn test_code_fence_skipping() {
        let mut processor = processor();
        let input = "```\n:::note\nnot a directive\n:::\n```";
        let output = processor.process(input).unwrap();

        assert_eq!(output, format!("{input}\n"));
        assert!(processor.nodes().is_empty());
        assert!(processor.warnings().is_empty());
    }

    #[test]
    fn test_fence_inside_body_is_verbatim() {
        let mut processor = processor();
        processor
            .process(":::note\n```\n:::\n```\n:::")
            .unwrap();

        assert_eq!(processor.nodes()[0].text, "```\n:::\n```");
    }

    #[test]
    fn test_indented_code_is_literal() {
        let mut processor = processor();
        let input = "Syntax:\n\n    :::note\n    Sample.\n    :::\n";
        let output = processor.process(input).unwrap();

        assert_eq!(output, input);
        assert!(processor.nodes().is_empty());
        assert!(processor.warnings().is_empty());
    }

    #[test]
    fn test_indented_opener_continuing_a_paragraph() {
        let mut processor = processor();
        let output = processor.process("Para\n    :::note\n    Body\n    :::\n").unwrap();

        assert_eq!(processor.nodes()[0].text, "Body");
        assert!(output.contains("\n<glide-node data-id=\"0\" "));
    }

    #[test]
    fn test_container_in_block_quote() {
        let mut processor = processor();
        let output = processor
            .process("> Quote.\n>\n> :::note\n> Secret.\n> :::\n")
            .unwrap();

        assert_eq!(processor.nodes().len(), 1);
        assert_eq!(processor.nodes()[0].text, "Secret.");
        assert_eq!(processor.nodes()[0].line, 3);
        assert!(output.lines().all(|line| line.starts_with('>')), "{output}");
        assert!(output.contains("> <glide-node data-id=\"0\" "));
        assert!(output.contains("\n> Secret.\n"));
        assert!(processor.warnings().is_empty());
    }

    #[test]
    fn test_block_quote_without_directives_is_untouched() {
        let mut processor = processor();
        let input = ">Quote\n>    code\n";
        assert_eq!(processor.process(input).unwrap(), input);
    }

    #[test]
    fn test_container_in_list_item_keeps_indentation() {
        let mut processor = processor();
        let output = processor
            .process("- Point one\n\n  :::note\n  Secret.\n  :::\n\n- Point two\n")
            .unwrap();

        assert_eq!(processor.nodes()[0].text, "Secret.");
        assert!(output.starts_with("- Point one\n\n\n  <glide-node data-id=\"0\" "));
        assert!(output.contains("\n\n  Secret.\n\n  <glide-node-end data-id=\"0\" "));
        assert!(output.ends_with("\n\n- Point two\n"));
    }

    #[test]
    fn test_container_on_list_marker_line() {
        let mut processor = processor();
        let output = processor
            .process("- :::note\n  Secret.\n  :::\n- Next\n")
            .unwrap();

        assert_eq!(processor.nodes()[0].text, "Secret.");
        assert!(output.starts_with("- <glide-node data-id=\"0\" "));
        assert!(output.contains("\n\n  Secret.\n\n  <glide-node-end"));
        assert!(output.ends_with("- Next\n"));
    }

    #[test]
    fn test_unsupported_position_warns() {
        let mut processor = processor();
        let input = "- > :::note\n  > Kept.\n";
        let output = processor.process(input).unwrap();

        assert_eq!(output, input);
        assert_eq!(
            processor.warnings(),
            ["line 1: :::note is not expanded at this position and is kept as text"]
        );
    }

    #[test]
    fn test_unknown_directive_passthrough() {
        let mut processor = processor();
        let input = ":::unknown[Label]{#x}\nBody\n:::";
        let output = processor.process(input).unwrap();

        assert_eq!(output, format!("{input}\n"));
        assert!(processor.warnings().is_empty());
    }

    #[test]
    fn test_unclosed_container_warning() {
        let mut processor = processor();
        processor.process(":::note\nContent").unwrap();

        assert_eq!(processor.nodes()[0].text, "Content");
        assert!(processor.warnings()[0].contains("unclosed container directive :::note"));
    }

    #[test]
    fn test_stray_close_warning() {
        let config = DirectiveProcessorConfig::new().with_source_path("docs/a.md");
        let mut processor = DirectiveProcessor::with_config(config);

        let output = processor.process("text\n:::").unwrap();

        assert_eq!(output, "text\n:::\n");
        assert_eq!(
            processor.warnings(),
            ["docs/a.md:2: stray ::: with no opening directive"]
        );
    }

    #[test]
    fn test_ids_are_per_processor() {
        let mut first = processor();
        let mut second = processor();
        first.process(":::note\nA\n:::").unwrap();
        second.process(":::note\nB\n:::").unwrap();

        assert_eq!(first.nodes()[0].id, "note-0");
        assert_eq!(second.nodes()[0].id, "note-0");
        assert_eq!(second.into_nodes()[0].text, "B");
    }

    #[test]
    fn test_config_builder() {
        let config = DirectiveProcessorConfig::new()
            .with_source_path("/docs/guide.md")
            .with_max_nesting_depth(5);

        assert_eq!(config.source_path, Some(PathBuf::from("/docs/guide.md")));
        assert_eq!(config.max_nesting_depth, 5);
    }
}
