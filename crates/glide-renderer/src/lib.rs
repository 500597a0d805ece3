//! Directive-aware markdown renderer with pluggable backends.
//!
//! Documents go through two stages:
//!
//! 1. [`directive::DirectiveProcessor`] expands `:::name` container
//!    directives into [`Node`]s, leaving node markers in the markdown.
//! 2. [`MarkdownRenderer`] renders the markdown through a [`RenderBackend`]
//!    and hands every node to the handlers its type registered for the
//!    active [`OutputFormat`].
//!
//! Directives and node handlers are collected in a [`Registry`], usually by
//! loading [`Extension`]s.
//!
//! # Architecture
//!
//! Shared functionality (lists, headings, inline formatting, nodes) is
//! handled by the generic renderer. Target syntax is delegated to the backend:
//! - [`HtmlBackend`]: semantic HTML5 (`html`, `handouts`, `revealjs`, `epub`)
//! - [`TextBackend`]: plain text
//! - [`LatexBackend`]: LaTeX body
//! - [`ManBackend`]: roff man page
//!
//! # Example
//!
//! ```
//! use glide_renderer::{HtmlBackend, MarkdownRenderer, OutputFormat};
//!
//! let result = MarkdownRenderer::<HtmlBackend>::new(OutputFormat::Html)
//!     .with_title_extraction()
//!     .render_markdown("# Hello\n\n**Bold** text");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.output.contains("<strong>Bold</strong>"));
//! ```

mod backend;
pub mod directive;
mod format;
mod html;
mod latex;
mod man;
mod node;
mod registry;
mod renderer;
mod state;
mod text;
mod util;

pub use backend::{InlineKind, RenderBackend};
pub use format::{BackendKind, OutputFormat, UnknownFormat};
pub use html::HtmlBackend;
pub use latex::LatexBackend;
pub use man::ManBackend;
pub use node::Node;
pub use registry::{
    DepartFn, Extension, ExtensionMetadata, Handler, NodeHandlers, Registry, Translator, Visit,
    VisitFn,
};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
pub use text::TextBackend;
pub use util::relative_path;
