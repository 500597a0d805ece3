//! Output formats known to the build.
//!
//! The set is closed: node handler tables are keyed by [`OutputFormat`], and a
//! format without an entry in a table suppresses the node (see
//! [`NodeHandlers`](crate::NodeHandlers)).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target representation produced by a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Ebook (EPUB XHTML content documents).
    Epub,
    /// Primary HTML site.
    Html,
    /// Printable handouts accompanying a slide deck.
    Handouts,
    /// Typeset output (LaTeX, for PDF).
    Latex,
    /// reveal.js slide deck.
    #[serde(rename = "revealjs")]
    RevealJs,
    /// Plain text.
    Text,
    /// Manual page (roff).
    Man,
}

/// Backend family that renders a format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Html,
    Text,
    Latex,
    Man,
}

impl OutputFormat {
    /// Every supported format, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Epub,
        Self::Html,
        Self::Handouts,
        Self::Latex,
        Self::RevealJs,
        Self::Text,
        Self::Man,
    ];

    /// Canonical lowercase name used in configuration and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Epub => "epub",
            Self::Html => "html",
            Self::Handouts => "handouts",
            Self::Latex => "latex",
            Self::RevealJs => "revealjs",
            Self::Text => "text",
            Self::Man => "man",
        }
    }

    /// Backend family used to render this format.
    #[must_use]
    pub fn backend(self) -> BackendKind {
        match self {
            Self::Epub | Self::Html | Self::Handouts | Self::RevealJs => BackendKind::Html,
            Self::Latex => BackendKind::Latex,
            Self::Text => BackendKind::Text,
            Self::Man => BackendKind::Man,
        }
    }

    /// File extension for documents written in this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Epub => "xhtml",
            Self::Html | Self::Handouts | Self::RevealJs => "html",
            Self::Latex => "tex",
            Self::Text => "txt",
            Self::Man => "1",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format {name:?} (expected one of: {valid})", valid = valid_names())]
pub struct UnknownFormat {
    /// The rejected name.
    pub name: String,
}

fn valid_names() -> String {
    OutputFormat::ALL
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| UnknownFormat {
                name: s.to_owned(),
            })
    }
}
