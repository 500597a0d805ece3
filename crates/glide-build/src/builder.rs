//! Per-document build pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glide_renderer::directive::DirectiveProcessorConfig;
use glide_renderer::{
    BackendKind, HtmlBackend, LatexBackend, ManBackend, MarkdownRenderer, Node, OutputFormat,
    Registry, RenderBackend, RenderResult, TextBackend, TocEntry,
};
use rayon::prelude::*;

use crate::{BuildError, SourceDocument};

/// Builder settings.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output format to produce.
    pub format: OutputFormat,
    /// Build documents on the rayon pool when every extension allows it.
    pub parallel: bool,
    /// Use the first H1 of each document as its title.
    pub title_from_h1: bool,
    /// Maximum depth of nested directives.
    pub max_nesting_depth: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Html,
            parallel: true,
            title_from_h1: true,
            max_nesting_depth: 10,
        }
    }
}

/// One rendered document.
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    /// Source path relative to the source directory.
    pub source_path: PathBuf,
    /// Output path relative to the output directory.
    pub output_path: PathBuf,
    /// Rendered output.
    pub output: String,
    /// Title from the first H1, if enabled and present.
    pub title: Option<String>,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Warnings from directive expansion and rendering.
    pub warnings: Vec<String>,
}

/// Outcome of building a set of documents.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Successfully built documents, in input order.
    pub documents: Vec<BuiltDocument>,
    /// Documents that failed, in input order.
    pub failures: Vec<BuildError>,
}

impl BuildReport {
    /// Whether every document was built.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of warnings across documents.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.documents.iter().map(|d| d.warnings.len()).sum()
    }
}

/// Builds documents with the directives and node handlers of a shared registry.
///
/// Every document gets its own directive processor and renderer, so documents
/// share nothing but the read-only [`Registry`].
pub struct Builder {
    registry: Arc<Registry>,
    config: BuildConfig,
}

impl Builder {
    #[must_use]
    pub fn new(registry: Arc<Registry>, config: BuildConfig) -> Self {
        Self { registry, config }
    }

    /// Whether [`build_all`](Self::build_all) builds on the rayon pool.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.config.parallel && self.registry.parallel_read_safe()
    }

    /// Build one document from its markdown.
    ///
    /// `path` is the source path relative to the source directory; it names the
    /// output file and appears in messages.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Directive`] when a directive rejects its input.
    pub fn build_source(&self, path: &Path, markdown: &str) -> Result<BuiltDocument, BuildError> {
        let mut processor = self.registry.processor(
            DirectiveProcessorConfig::new()
                .with_source_path(path)
                .with_max_nesting_depth(self.config.max_nesting_depth),
        );
        let expanded = processor
            .process(markdown)
            .map_err(|source| BuildError::Directive {
                path: path.to_path_buf(),
                source,
            })?;

        let mut warnings = processor.warnings().to_vec();
        let nodes = processor.into_nodes();
        let base_path = page_path(path);

        let result = match self.config.format.backend() {
            BackendKind::Html => self.render::<HtmlBackend>(&expanded, nodes, &base_path),
            BackendKind::Text => self.render::<TextBackend>(&expanded, nodes, &base_path),
            BackendKind::Latex => self.render::<LatexBackend>(&expanded, nodes, &base_path),
            BackendKind::Man => self.render::<ManBackend>(&expanded, nodes, &base_path),
        };
        warnings.extend(
            result
                .warnings
                .into_iter()
                .map(|w| format!("{}: {w}", path.display())),
        );
        tracing::debug!(
            path = %path.display(),
            format = %self.config.format,
            warnings = warnings.len(),
            "Built document"
        );
        Ok(BuiltDocument {
            source_path: path.to_path_buf(),
            output_path: path.with_extension(self.config.format.extension()),
            output: result.output,
            title: result.title,
            toc: result.toc,
            warnings,
        })
    }

    fn render<B: RenderBackend>(
        &self,
        markdown: &str,
        nodes: Vec<Node>,
        base_path: &str,
    ) -> RenderResult {
        let mut renderer = MarkdownRenderer::<B>::new(self.config.format)
            .with_base_path(base_path)
            .with_nodes(Arc::clone(&self.registry), nodes);
        if self.config.title_from_h1 {
            renderer = renderer.with_title_extraction();
        }
        renderer.render_markdown(markdown)
    }

    /// Read and build one scanned document.
    fn build_document(&self, document: &SourceDocument) -> Result<BuiltDocument, BuildError> {
        let markdown = fs::read_to_string(&document.path).map_err(|source| BuildError::Io {
            path: document.path.clone(),
            source,
        })?;
        self.build_source(&document.relative_path, &markdown)
    }

    /// Build every document.
    ///
    /// Failures are collected per document; the other documents still build.
    #[must_use]
    pub fn build_all(&self, documents: &[SourceDocument]) -> BuildReport {
        let parallel = self.is_parallel();
        tracing::info!(
            count = documents.len(),
            format = %self.config.format,
            parallel,
            "Building documents"
        );

        let results: Vec<Result<BuiltDocument, BuildError>> = if parallel {
            documents
                .par_iter()
                .map(|d| self.build_document(d))
                .collect()
        } else {
            documents.iter().map(|d| self.build_document(d)).collect()
        };

        let mut report = BuildReport::default();
        for result in results {
            match result {
                Ok(document) => report.documents.push(document),
                Err(error) => report.failures.push(error),
            }
        }
        report
    }
}

/// Write every built document under `output_dir`.
///
/// Returns the written paths.
///
/// # Errors
///
/// Returns [`BuildError::Io`] for the first file or directory that cannot be
/// written.
pub fn write(report: &BuildReport, output_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BuildError::Io { path, source }
    };

    let mut written = Vec::with_capacity(report.documents.len());
    for document in &report.documents {
        let path = output_dir.join(&document.output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&path, &document.output).map_err(io_error(&path))?;
        tracing::debug!(path = %path.display(), "Wrote output");
        written.push(path);
    }
    Ok(written)
}

/// Page path of a source: relative path without extension, `/`-separated.
fn page_path(path: &Path) -> String {
    path.with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use glide_renderer::directive::{
        Directive, DirectiveBlock, DirectiveError, DirectiveState,
    };
    use glide_renderer::{NodeHandlers, Translator, Visit};
    use pretty_assertions::assert_eq;

    use super::*;

    struct Boxed;

    impl Directive for Boxed {
        fn name(&self) -> &str {
            "boxed"
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
            let mut node = state.new_node("boxed", block.text());
            state.nested_parse(block, &mut node)?;
            Ok(vec![node])
        }
    }

    fn open(t: &mut Translator<'_>, _: &Node) -> Visit {
        t.body.push('[');
        Visit::Children
    }

    fn close(t: &mut Translator<'_>, _: &Node) {
        t.body.push(']');
    }

    fn builder(format: OutputFormat) -> Builder {
        let mut registry = Registry::new();
        registry.add_directive(Boxed);
        let mut handlers = NodeHandlers::new();
        for format in OutputFormat::ALL {
            handlers = handlers.with(format, open, Some(close));
        }
        registry.add_node("boxed", handlers);

        Builder::new(
            Arc::new(registry),
            BuildConfig {
                format,
                ..BuildConfig::default()
            },
        )
    }

    #[test]
    fn test_page_path() {
        assert_eq!(page_path(Path::new("talks/dicts.md")), "talks/dicts");
        assert_eq!(page_path(Path::new("index.md")), "index");
    }

    #[test]
    fn test_build_source_html() {
        let doc = builder(OutputFormat::Html)
            .build_source(
                Path::new("talks/dicts.md"),
                "# Dicts\n\nSee [lists](/basics/lists.md).\n\n:::boxed\nInside.\n:::\n",
            )
            .unwrap();

        assert_eq!(doc.title.as_deref(), Some("Dicts"));
        assert_eq!(doc.output_path, PathBuf::from("talks/dicts.html"));
        assert_eq!(
            doc.output,
            concat!(
                r#"<h1 id="dicts">Dicts</h1>"#,
                r#"<p>See <a href="../basics/lists.html">lists</a>.</p>"#,
                "[<p>Inside.</p>]"
            )
        );
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_output_extension_follows_format() {
        for (format, expected) in [
            (OutputFormat::Latex, "a.tex"),
            (OutputFormat::Text, "a.txt"),
            (OutputFormat::Man, "a.1"),
            (OutputFormat::Epub, "a.xhtml"),
            (OutputFormat::RevealJs, "a.html"),
        ] {
            let doc = builder(format)
                .build_source(Path::new("a.md"), "Text.\n")
                .unwrap();
            assert_eq!(doc.output_path, PathBuf::from(expected), "{format}");
        }
    }

    #[test]
    fn test_directive_error_names_document() {
        let err = builder(OutputFormat::Html)
            .build_source(Path::new("bad.md"), ":::boxed\n:::\n")
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Directive {
                source: DirectiveError::ContentRequired { line: 1, .. },
                ..
            }
        ));
        assert_eq!(err.path(), Path::new("bad.md"));
    }

    #[test]
    fn test_warnings_are_prefixed_with_path() {
        let doc = builder(OutputFormat::Text)
            .build_source(Path::new("w.md"), "Text.\n\n:::\n")
            .unwrap();

        assert_eq!(doc.warnings, ["w.md:3: stray ::: with no opening directive"]);
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_document_warnings_are_returned_not_logged() {
        let doc = builder(OutputFormat::Html)
            .build_source(Path::new("w.md"), "Text.\n\n:::\n")
            .unwrap();

        assert_eq!(doc.warnings.len(), 1);
        assert!(logs_contain("warnings=1"));
        assert!(!logs_contain("WARN"));
        assert!(!logs_contain("stray :::"));
    }

    #[test]
    fn test_build_all_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.md"), "Good.\n").unwrap();
        fs::write(dir.path().join("bad.md"), ":::boxed\n:::\n").unwrap();
        let documents = crate::Scanner::new(dir.path()).scan();

        let report = builder(OutputFormat::Text).build_all(&documents);

        assert!(!report.is_success());
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].output, "Good.\n");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path(), Path::new("bad.md"));
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let document = SourceDocument {
            path: PathBuf::from("/nonexistent/glide/a.md"),
            relative_path: PathBuf::from("a.md"),
        };
        let report = builder(OutputFormat::Html).build_all(&[document]);

        assert!(matches!(report.failures[0], BuildError::Io { .. }));
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let builder = builder(OutputFormat::Html);
        let report = BuildReport {
            documents: vec![
                builder
                    .build_source(Path::new("talks/one.md"), "One.\n")
                    .unwrap(),
            ],
            failures: Vec::new(),
        };

        let written = write(&report, dir.path()).unwrap();

        assert_eq!(written, [dir.path().join("talks/one.html")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("talks/one.html")).unwrap(),
            "<p>One.</p>"
        );
    }
}
