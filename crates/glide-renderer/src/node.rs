//! Custom document nodes produced by directives.
//!
//! A node's rendered children travel through pulldown-cmark between a pair of
//! intermediate block markers, `<glide-node data-id="N" data-key="K">` and
//! `<glide-node-end data-id="N" data-key="K">`, where `N` indexes the
//! per-document node list and `K` is the document's marker key. The renderer
//! intercepts the markers and dispatches to the node type's handlers.
//!
//! The key is derived from the document source, so markup an author types
//! cannot pass for a marker: the renderer only accepts a marker whose key
//! matches the node it names.

use std::hash::{DefaultHasher, Hash, Hasher};

/// A node created by a directive occurrence.
///
/// Nodes live for one document build: they are owned by the document's
/// [`DirectiveProcessor`](crate::directive::DirectiveProcessor) and then by
/// its renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Node type, used to look up handlers (e.g. `"speakernote"`).
    pub kind: &'static str,
    /// Generated identifier, unique within the document (`"{kind}-{n}"`).
    pub id: String,
    /// Explicit names for cross-referencing.
    pub names: Vec<String>,
    /// Classes from the directive's attributes.
    pub classes: Vec<String>,
    /// Raw nested content, verbatim.
    pub text: String,
    /// Line of the directive tag (1-indexed).
    pub line: usize,
    /// Nested-parsed body emitted between the markers.
    pub(crate) body: String,
    /// Marker key of the document the node was expanded in.
    pub(crate) key: u64,
}

impl Node {
    pub(crate) fn new(kind: &'static str, id: String, text: String, line: usize) -> Self {
        Self {
            kind,
            id,
            names: Vec::new(),
            classes: Vec::new(),
            text,
            line,
            body: String::new(),
            key: 0,
        }
    }

    /// Nested-parsed body (markdown with inner directives expanded).
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

const OPEN_PREFIX: &str = r#"<glide-node data-id=""#;
const CLOSE_PREFIX: &str = r#"<glide-node-end data-id=""#;

/// Marker key for a document source.
pub(crate) fn marker_key(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

/// A node marker found in an HTML block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeMarker {
    Open { index: usize, key: u64 },
    Close { index: usize, key: u64 },
}

impl NodeMarker {
    /// Recognize a marker line emitted by [`wrap_node`].
    ///
    /// Only the shape is checked here; whether the key belongs to the node is
    /// up to the caller.
    pub(crate) fn parse(html: &str) -> Option<Self> {
        let html = html.trim();
        if let Some(rest) = html.strip_prefix(CLOSE_PREFIX) {
            let (index, key) = parse_attrs(rest)?;
            return Some(Self::Close { index, key });
        }
        let (index, key) = parse_attrs(html.strip_prefix(OPEN_PREFIX)?)?;
        Some(Self::Open { index, key })
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Open { index, .. } | Self::Close { index, .. } => index,
        }
    }

    pub(crate) fn key(self) -> u64 {
        match self {
            Self::Open { key, .. } | Self::Close { key, .. } => key,
        }
    }
}

/// Parse `N" data-key="K">`.
fn parse_attrs(rest: &str) -> Option<(usize, u64)> {
    let (index, rest) = rest.split_once('"')?;
    let key = rest.strip_prefix(r#" data-key=""#)?.strip_suffix("\">")?;
    if key.len() != 16 {
        return None;
    }
    Some((index.parse().ok()?, u64::from_str_radix(key, 16).ok()?))
}

fn push_marker(prefix: &str, index: usize, key: u64, out: &mut String) {
    out.push_str(prefix);
    out.push_str(&format!("{index}\" data-key=\"{key:016x}\">"));
}

/// Append a node's body between its markers.
///
/// Markers sit alone between blank lines so pulldown-cmark treats each one as
/// its own HTML block and parses the body as ordinary markdown. The output
/// starts and ends with a blank line boundary.
pub(crate) fn wrap_node(index: usize, key: u64, body: &str, out: &mut String) {
    out.push('\n');
    push_marker(OPEN_PREFIX, index, key, out);
    out.push_str("\n\n");
    out.push_str(body.trim_end_matches('\n'));
    out.push_str("\n\n");
    push_marker(CLOSE_PREFIX, index, key, out);
    out.push_str("\n\n");
}
