//! `glide build` command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use glide_build::{BuildConfig, Builder, Scanner};
use glide_config::{CliSettings, Config};
use glide_renderer::{OutputFormat, Registry};

use crate::error::CliError;
use crate::extensions;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output format (html, revealjs, epub, handouts, latex, text, man).
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Directory containing markdown sources.
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Directory receiving built documents.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover glide.toml).
    #[arg(short, long, env = "GLIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Build documents one at a time.
    #[arg(long)]
    sequential: bool,

    /// Enable verbose output (show INFO level logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, extension loading or writing fails,
    /// or if any document fails to build.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            format: self.format,
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            parallel: self.sequential.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let settings = &config.build;

        let output = Output::new();
        output.info(&format!(
            "Building {} from {}",
            settings.format,
            settings.source_dir.display()
        ));

        let mut registry = Registry::new();
        extensions::load(&mut registry, &settings.extensions)?;

        let builder = Builder::new(
            Arc::new(registry),
            BuildConfig {
                format: settings.format,
                parallel: settings.parallel,
                title_from_h1: settings.title_from_h1,
                ..BuildConfig::default()
            },
        );

        let sources = Scanner::new(&settings.source_dir).scan();
        if sources.is_empty() {
            output.warning(&format!(
                "No markdown sources found in {}",
                settings.source_dir.display()
            ));
        }

        let report = builder.build_all(&sources);
        for document in &report.documents {
            for warning in &document.warnings {
                output.warning(warning);
            }
        }
        for failure in &report.failures {
            output.error(&failure.to_string());
        }

        let written = glide_build::write(&report, &settings.output_dir)?;

        if !report.is_success() {
            return Err(CliError::BuildFailed {
                failed: report.failures.len(),
                total: sources.len(),
            });
        }

        output.success(&format!(
            "Built {} document(s) into {} ({} warning(s))",
            written.len(),
            settings.output_dir.display(),
            report.warning_count()
        ));
        Ok(())
    }
}
