//! Source discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

/// A markdown source found by the [`Scanner`].
///
/// Only the location is recorded; content is read when the document is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path to the `.md` file.
    pub path: PathBuf,
    /// Path relative to the source directory (e.g. `talks/dicts.md`).
    pub relative_path: PathBuf,
}

/// Discovers `*.md` sources under a directory.
///
/// Hidden files and directories (leading `.`) are skipped. Results are sorted
/// by relative path so builds are reproducible.
pub struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    /// Scan the source directory.
    ///
    /// Returns an empty Vec if the source directory doesn't exist.
    #[must_use]
    pub fn scan(&self) -> Vec<SourceDocument> {
        let mut documents = Vec::new();
        if self.source_dir.is_dir() {
            self.scan_directory(&self.source_dir, Path::new(""), &mut documents);
        }
        documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        tracing::debug!(
            source_dir = %self.source_dir.display(),
            count = documents.len(),
            "Scanned sources"
        );
        documents
    }

    fn scan_directory(&self, dir: &Path, prefix: &Path, documents: &mut Vec<SourceDocument>) {
        let Ok(entries) = fs::read_dir(dir) else {
            tracing::warn!(dir = %dir.display(), "Cannot read directory");
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            let relative_path = prefix.join(&name);
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.scan_directory(&path, &relative_path, documents);
            } else if path.extension().is_some_and(|e| e == "md") {
                documents.push(SourceDocument {
                    path,
                    relative_path,
                });
            }
        }
    }
}
