//! Fault-tolerant building blocks for Markdown tag preprocessors.
//!
//! A preprocessor scans documents for custom inline tags and replaces each
//! one with computed content. This crate provides the parts every such
//! preprocessor needs:
//!
//! - [`get_tag_context`]: bounded excerpts around a match for diagnostics
//! - [`get_options`]: typed parsing of a tag's `key="value"` attributes
//! - [`allow_fail`]: isolates a failing tag so the run continues and the tag
//!   stays as written
//! - [`WarningSink`]: reports problems to the log and to the user
//! - [`process_tags_for_all_files`]: applies a tag pattern to every document
//!   in a working directory
//!
//! [`Preprocessor`] bundles them with a [`PreprocessorConfig`].
//!
//! # Example
//!
//! ```
//! use mdtag::{BufferedOutput, Preprocessor, PreprocessorConfig, Tag, TagError};
//! use regex::Regex;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("index.md"), "Hello <name upper=\"true\">world</name>").unwrap();
//!
//! let pattern = Regex::new(r"<name(?P<options>[^>]*)>(?P<body>.*?)</name>").unwrap();
//! let preprocessor = Preprocessor::new(PreprocessorConfig::new(dir.path()), pattern)
//!     .with_output(BufferedOutput::default());
//!
//! preprocessor
//!     .apply(|tag: &Tag<'_>| -> Result<String, TagError> {
//!         let options = mdtag::get_options(tag.name("options").unwrap_or_default())?;
//!         let body = tag.name("body").unwrap_or_default();
//!         Ok(if options.get_bool("upper") == Some(true) {
//!             body.to_uppercase()
//!         } else {
//!             body.to_owned()
//!         })
//!     })
//!     .unwrap();
//!
//! let content = std::fs::read_to_string(dir.path().join("index.md")).unwrap();
//! assert_eq!(content, "Hello WORLD");
//! ```

mod batch;
mod context;
mod invoker;
mod options;
mod preprocessor;
mod tag;
mod warning;

pub use batch::{BatchError, BatchSummary, DEFAULT_LOG_MESSAGE, process_tags_for_all_files};
pub use context::{DEFAULT_CONTEXT_LIMIT, get_tag_context};
pub use invoker::{DEFAULT_FAIL_MESSAGE, TagError, allow_fail};
pub use mdtag_config::{ConfigError, PreprocessorConfig};
pub use options::{
    OptionError, ScalarError, ScalarValue, TagOptions, decode_scalar, get_options,
};
pub use preprocessor::Preprocessor;
pub use tag::{CurrentFile, Tag, TagMatch, replace_all};
pub use warning::{BufferedOutput, UserOutput, Warning, WarningSink};
