//! Configuration management for Glide.
//!
//! Parses `glide.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [build]
//! format = "revealjs"
//! source_dir = "docs"
//! output_dir = "${SLIDES_OUT:-_build}"
//! parallel = true
//! extensions = ["speaker"]
//! title_from_h1 = true
//! ```
//!
//! ## Path Expansion
//!
//! `build.source_dir` and `build.output_dir` support `${VAR}`,
//! `${VAR:-default}` and a leading `~`. Relative paths are resolved against
//! the directory of the config file.

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glide_renderer::OutputFormat;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output format.
    pub format: Option<OutputFormat>,
    /// Override markdown source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override parallel build flag.
    pub parallel: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "glide.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build section (paths are unexpanded strings from TOML).
    #[serde(rename = "build")]
    build_raw: BuildConfigRaw,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build: BuildSettings,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    format: Option<OutputFormat>,
    source_dir: Option<String>,
    output_dir: Option<String>,
    parallel: Option<bool>,
    extensions: Option<Vec<String>>,
    title_from_h1: Option<bool>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Output format to build.
    pub format: OutputFormat,
    /// Directory scanned for markdown sources.
    pub source_dir: PathBuf,
    /// Directory receiving built documents.
    pub output_dir: PathBuf,
    /// Whether documents may be built in parallel.
    pub parallel: bool,
    /// Extensions to load, in order.
    pub extensions: Vec<String>,
    /// Whether the first H1 of a document is its title.
    pub title_from_h1: bool,
}

impl BuildSettings {
    fn with_base(base: &Path) -> Self {
        Self {
            format: OutputFormat::Html,
            source_dir: base.join("docs"),
            output_dir: base.join("_build"),
            parallel: true,
            extensions: vec!["speaker".to_owned()],
            title_from_h1: true,
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`build.output_dir`").
        field: String,
        /// Error message (e.g., "${`SLIDES_OUT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `glide.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(format) = settings.format {
            self.build.format = format;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.build.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build.output_dir.clone_from(output_dir);
        }
        if let Some(parallel) = settings.parallel {
            self.build.parallel = parallel;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            build_raw: BuildConfigRaw::default(),
            build: BuildSettings::with_base(base),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Expand and resolve the raw build section against the config directory.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let raw = &self.build_raw;
        let resolve_dir = |value: Option<&str>, default: &str, field: &str| {
            let expanded = expand::expand_path(value.unwrap_or(default), field)?;
            Ok::<_, ConfigError>(config_dir.join(expanded))
        };

        self.build = BuildSettings {
            format: raw.format.unwrap_or(OutputFormat::Html),
            source_dir: resolve_dir(raw.source_dir.as_deref(), "docs", "build.source_dir")?,
            output_dir: resolve_dir(raw.output_dir.as_deref(), "_build", "build.output_dir")?,
            parallel: raw.parallel.unwrap_or(true),
            extensions: raw
                .extensions
                .clone()
                .unwrap_or_else(|| vec!["speaker".to_owned()]),
            title_from_h1: raw.title_from_h1.unwrap_or(true),
        };
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an extension name is empty or
    /// listed twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for name in &self.build.extensions {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "build.extensions cannot contain an empty name".to_owned(),
                ));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "build.extensions lists \"{name}\" more than once"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/talks"));
        assert_eq!(config.build.format, OutputFormat::Html);
        assert_eq!(config.build.source_dir, PathBuf::from("/talks/docs"));
        assert_eq!(config.build.output_dir, PathBuf::from("/talks/_build"));
        assert!(config.build.parallel);
        assert_eq!(config.build.extensions, ["speaker"]);
        assert!(config.build.title_from_h1);
        assert_eq!(config.config_path, None);
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve(Path::new("/talks")).unwrap();
        assert_eq!(config.build, BuildSettings::with_base(Path::new("/talks")));
    }

    #[test]
    fn test_parse_build_config() {
        let toml = r#"
[build]
format = "revealjs"
source_dir = "slides"
output_dir = "/var/www/deck"
parallel = false
extensions = []
title_from_h1 = false
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/talks")).unwrap();

        assert_eq!(
            config.build,
            BuildSettings {
                format: OutputFormat::RevealJs,
                source_dir: PathBuf::from("/talks/slides"),
                output_dir: PathBuf::from("/var/www/deck"),
                parallel: false,
                extensions: Vec::new(),
                title_from_h1: false,
            }
        );
    }

    #[test]
    fn test_unknown_format_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[build]\nformat = \"pdf\"\n");
        let err = ConfigError::from(result.unwrap_err());
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn test_validate_rejects_empty_extension() {
        let mut config = Config::default_with_base(Path::new("/talks"));
        config.build.extensions = vec![" ".to_owned()];
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: build.extensions cannot contain an empty name"
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_extension() {
        let mut config = Config::default_with_base(Path::new("/talks"));
        config.build.extensions = vec!["speaker".to_owned(), "speaker ".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("\"speaker\" more than once"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[build]\nformat = \"text\"\n");

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.build.format, OutputFormat::Text);
        assert_eq!(config.build.source_dir, dir.path().join("docs"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[build]\nextensions = [\"\"]\n");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[build]\nformat = \"html\"\nparallel = true\n",
        );
        let settings = CliSettings {
            format: Some(OutputFormat::RevealJs),
            source_dir: Some(PathBuf::from("/elsewhere/src")),
            output_dir: Some(PathBuf::from("/elsewhere/out")),
            parallel: Some(false),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.build.format, OutputFormat::RevealJs);
        assert_eq!(config.build.source_dir, PathBuf::from("/elsewhere/src"));
        assert_eq!(config.build.output_dir, PathBuf::from("/elsewhere/out"));
        assert!(!config.build.parallel);
        assert_eq!(config.build.extensions, ["speaker"]);
    }

    #[test]
    fn test_output_dir_env_expansion() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GLIDE_TEST_DECK_DIR", "/srv/decks");
        }
        let mut config: Config =
            toml::from_str("[build]\noutput_dir = \"${GLIDE_TEST_DECK_DIR}/python\"\n").unwrap();
        let result = config.resolve(Path::new("/talks"));
        unsafe {
            std::env::remove_var("GLIDE_TEST_DECK_DIR");
        }

        result.unwrap();
        assert_eq!(config.build.output_dir, PathBuf::from("/srv/decks/python"));
    }

    #[test]
    fn test_output_dir_missing_env_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GLIDE_TEST_NOPE");
        }
        let mut config: Config =
            toml::from_str("[build]\noutput_dir = \"${GLIDE_TEST_NOPE}\"\n").unwrap();
        let err = config.resolve(Path::new("/talks")).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "build.output_dir"));
    }
}
