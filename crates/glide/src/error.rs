//! CLI error types.

use glide_build::BuildError;
use glide_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("unknown extension \"{name}\" (available: {available})")]
    UnknownExtension { name: String, available: String },

    #[error("{failed} of {total} document(s) failed to build")]
    BuildFailed { failed: usize, total: usize },
}
