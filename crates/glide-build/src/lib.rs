//! Document builds for Glide.
//!
//! [`Scanner`] finds markdown sources, [`Builder`] expands their directives
//! and renders them for one output format, and [`write`] stores the results.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use glide_build::{BuildConfig, Builder, Scanner};
//! use glide_renderer::Registry;
//!
//! let builder = Builder::new(Arc::new(Registry::new()), BuildConfig::default());
//! let report = builder.build_all(&Scanner::new("docs").scan());
//! glide_build::write(&report, Path::new("_build"))?;
//! # Ok::<(), glide_build::BuildError>(())
//! ```

mod builder;
mod error;
mod scanner;

pub use builder::{BuildConfig, BuildReport, Builder, BuiltDocument, write};
pub use error::BuildError;
pub use scanner::{Scanner, SourceDocument};
