//! Pluggable container directives.
//!
//! Directives use the `CommonMark` generic directive container syntax:
//!
//! ```text
//! :::name[label]{#name .class key="value"}
//! Body, parsed as markdown.
//! :::
//! ```
//!
//! # Processing Model
//!
//! 1. **Expansion** ([`DirectiveProcessor::process`]): each container's body is
//!    collected and handed to its [`Directive`], which returns
//!    [`Node`](crate::Node)s. Node bodies are nested-parsed (inner directives
//!    expanded) and emitted between intermediate node markers that pass
//!    through pulldown-cmark as HTML blocks.
//!
//! 2. **Rendering**: [`MarkdownRenderer`](crate::MarkdownRenderer) meets the
//!    markers while walking events and calls the node type's handlers for the
//!    active output format (see [`NodeHandlers`](crate::NodeHandlers)).

mod args;
mod container;
mod context;
mod error;
mod fence;
mod layout;
mod parser;
mod processor;
mod state;

pub use args::DirectiveArgs;
pub use container::{Directive, DirectiveBlock};
pub use context::DirectiveContext;
pub use error::DirectiveError;
pub use processor::{DirectiveProcessor, DirectiveProcessorConfig};
pub use state::DirectiveState;
