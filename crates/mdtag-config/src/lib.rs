//! Configuration for mdtag preprocessors.
//!
//! A preprocessor runs over a working directory of documents. Settings can be
//! built in code or read from the `[preprocessor]` section of a TOML file:
//!
//! ```toml
//! [preprocessor]
//! working_dir = "${DOCS_DIR:-docs}"
//! debug = false
//! quiet = false
//! extensions = ["md"]
//! context_limit = 100
//! ```
//!
//! `working_dir` supports environment variable expansion (`${VAR}` and
//! `${VAR:-default}`) and is resolved relative to the config file's directory.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default number of characters shown around a tag in diagnostics.
pub const DEFAULT_CONTEXT_LIMIT: usize = 100;

/// Default document extension.
const DEFAULT_EXTENSION: &str = "md";

/// Top-level layout of a config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    preprocessor: PreprocessorConfigRaw,
}

/// Preprocessor section as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PreprocessorConfigRaw {
    working_dir: Option<String>,
    debug: Option<bool>,
    quiet: Option<bool>,
    extensions: Option<Vec<String>>,
    context_limit: Option<usize>,
}

/// Resolved preprocessor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessorConfig {
    /// Root of the document tree being processed.
    pub working_dir: PathBuf,
    /// Show context and error details to the user, not only in the log.
    pub debug: bool,
    /// Suppress user-facing output. The log is still written.
    pub quiet: bool,
    /// Document extensions to process, without the leading dot.
    pub extensions: Vec<String>,
    /// Characters of context shown on each side of a tag in diagnostics.
    pub context_limit: usize,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl PreprocessorConfig {
    /// Create a configuration with default values for the given working directory.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            debug: false,
            quiet: false,
            extensions: vec![DEFAULT_EXTENSION.to_owned()],
            context_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }

    /// Enable or disable debug output.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable or disable quiet mode.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set the recognized document extensions.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the context limit used for diagnostics.
    #[must_use]
    pub fn with_context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// A relative `working_dir` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, can't be read, or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::from_toml_str(&content, base_dir)
    }

    /// Parse configuration from TOML content.
    ///
    /// Missing keys take their default values. A relative `working_dir` is
    /// resolved against `base_dir`; a missing one becomes `base_dir` itself.
    ///
    /// # Errors
    ///
    /// Returns error on invalid TOML, unset environment variables, or failed validation.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let raw = file.preprocessor;

        let working_dir = match raw.working_dir {
            Some(dir) => {
                let expanded = expand::expand_env(&dir, "preprocessor.working_dir")?;
                require_non_empty(&expanded, "preprocessor.working_dir")?;
                resolve_path(base_dir, &expanded)
            }
            None => base_dir.to_path_buf(),
        };

        let mut config = Self::new(working_dir);
        if let Some(debug) = raw.debug {
            config.debug = debug;
        }
        if let Some(quiet) = raw.quiet {
            config.quiet = quiet;
        }
        if let Some(extensions) = raw.extensions {
            config.extensions = extensions;
        }
        if let Some(limit) = raw.context_limit {
            config.context_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "preprocessor.working_dir cannot be empty".to_owned(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "preprocessor.extensions cannot be empty".to_owned(),
            ));
        }
        for ext in &self.extensions {
            require_non_empty(ext, "preprocessor.extensions")?;
            if ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "preprocessor.extensions entry \"{ext}\" must not start with a dot"
                )));
            }
        }
        Ok(())
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
        /// Config field path (e.g., "`preprocessor.working_dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
