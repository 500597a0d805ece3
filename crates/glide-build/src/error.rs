use std::path::PathBuf;

use glide_renderer::directive::DirectiveError;

/// Failure to build or write one document.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A directive rejected its input.
    #[error("{}: {source}", path.display())]
    Directive {
        path: PathBuf,
        #[source]
        source: DirectiveError,
    },
    /// Reading a source or writing an output failed.
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Document or output file the error is about.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Directive { path, .. } | Self::Io { path, .. } => path,
        }
    }
}
