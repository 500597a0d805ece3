//! Registration of directives, node types and extensions.
//!
//! A [`Registry`] is filled once at startup (usually by loading
//! [`Extension`]s) and then shared read-only, typically behind an `Arc`,
//! by every document build.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::directive::{Directive, DirectiveProcessor, DirectiveProcessorConfig};
use crate::{Node, OutputFormat};

/// Outcome of a node's enter handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Render the node's children, then call the exit handler.
    Children,
    /// Suppress the node and its whole subtree. The exit handler is not called.
    SkipNode,
}

/// Output sink handed to node handlers.
pub struct Translator<'a> {
    /// Format being produced.
    pub format: OutputFormat,
    /// Output accumulated so far.
    pub body: &'a mut String,
}

/// Enter handler for a node type.
pub type VisitFn = fn(&mut Translator<'_>, &Node) -> Visit;

/// Exit handler for a node type.
pub type DepartFn = fn(&mut Translator<'_>, &Node);

/// Enter and exit handlers for one output format.
#[derive(Clone, Copy, Debug)]
pub struct Handler {
    pub visit: VisitFn,
    pub depart: Option<DepartFn>,
}

/// Per-format handler table of a node type.
///
/// Formats without an entry are suppressed at render time, with a warning.
#[derive(Clone, Debug, Default)]
pub struct NodeHandlers {
    table: [Option<Handler>; OutputFormat::ALL.len()],
}

impl NodeHandlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handlers for `format`.
    #[must_use]
    pub fn with(mut self, format: OutputFormat, visit: VisitFn, depart: Option<DepartFn>) -> Self {
        self.table[format.index()] = Some(Handler { visit, depart });
        self
    }

    /// Suppress the node for `format`.
    #[must_use]
    pub fn ignore(self, format: OutputFormat) -> Self {
        self.with(format, skip_node, None)
    }

    /// Handlers for `format`, if it has an entry.
    #[must_use]
    pub fn get(&self, format: OutputFormat) -> Option<Handler> {
        self.table[format.index()]
    }

    /// Formats with no entry.
    pub fn missing(&self) -> impl Iterator<Item = OutputFormat> + '_ {
        OutputFormat::ALL
            .into_iter()
            .filter(|format| self.get(*format).is_none())
    }
}

fn skip_node(_: &mut Translator<'_>, _: &Node) -> Visit {
    Visit::SkipNode
}

/// What an extension reports about itself once set up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionMetadata {
    pub version: &'static str,
    /// Whether documents may be read in parallel with the extension loaded.
    pub parallel_read_safe: bool,
}

/// A loadable bundle of directives and node types.
pub trait Extension: Send + Sync {
    /// Name the extension is loaded under (e.g. in `glide.toml`).
    fn name(&self) -> &str;

    /// Register the extension's directives and node types.
    fn setup(&self, registry: &mut Registry) -> ExtensionMetadata;
}

/// Directives, node handlers and loaded extensions.
#[derive(Default)]
pub struct Registry {
    directives: HashMap<String, Arc<dyn Directive>>,
    nodes: HashMap<&'static str, NodeHandlers>,
    extensions: Vec<(String, ExtensionMetadata)>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directive under its name, replacing any previous one.
    pub fn add_directive<D: Directive + 'static>(&mut self, directive: D) {
        let name = directive.name().to_string();
        if self
            .directives
            .insert(name.clone(), Arc::new(directive))
            .is_some()
        {
            tracing::debug!(directive = %name, "Replaced registered directive");
        }
    }

    /// Register the handlers of a node type, replacing any previous ones.
    pub fn add_node(&mut self, kind: &'static str, handlers: NodeHandlers) {
        let missing: Vec<_> = handlers.missing().map(OutputFormat::name).collect();
        if !missing.is_empty() {
            tracing::debug!(node = kind, ?missing, "Node type is suppressed for some formats");
        }
        if self.nodes.insert(kind, handlers).is_some() {
            tracing::debug!(node = kind, "Replaced registered node handlers");
        }
    }

    #[must_use]
    pub fn directive(&self, name: &str) -> Option<&Arc<dyn Directive>> {
        self.directives.get(name)
    }

    #[must_use]
    pub fn node_handlers(&self, kind: &str) -> Option<&NodeHandlers> {
        self.nodes.get(kind)
    }

    /// Load an extension.
    ///
    /// Loading is idempotent by extension name: a second call returns the
    /// metadata of the first and does not run setup again.
    pub fn setup_extension(&mut self, extension: &dyn Extension) -> ExtensionMetadata {
        let name = extension.name();
        if let Some((_, metadata)) = self.extensions.iter().find(|(n, _)| n == name) {
            tracing::debug!(extension = name, "Extension already loaded");
            return *metadata;
        }

        let metadata = extension.setup(self);
        tracing::info!(
            extension = name,
            version = metadata.version,
            parallel_read_safe = metadata.parallel_read_safe,
            "Loaded extension"
        );
        self.extensions.push((name.to_string(), metadata));
        metadata
    }

    /// Loaded extensions, in load order.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, ExtensionMetadata)> {
        self.extensions
            .iter()
            .map(|(name, metadata)| (name.as_str(), *metadata))
    }

    /// Whether every loaded extension allows parallel reads.
    #[must_use]
    pub fn parallel_read_safe(&self) -> bool {
        self.extensions
            .iter()
            .all(|(_, metadata)| metadata.parallel_read_safe)
    }

    /// Create a directive processor for one document.
    #[must_use]
    pub fn processor(&self, config: DirectiveProcessorConfig) -> DirectiveProcessor {
        self.directives
            .values()
            .fold(DirectiveProcessor::with_config(config), |processor, directive| {
                processor.with_shared_directive(Arc::clone(directive))
            })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut directives: Vec<_> = self.directives.keys().collect();
        directives.sort();
        let mut nodes: Vec<_> = self.nodes.keys().collect();
        nodes.sort();
        f.debug_struct("Registry")
            .field("directives", &directives)
            .field("nodes", &nodes)
            .field("extensions", &self.extensions)
            .finish()
    }
}
