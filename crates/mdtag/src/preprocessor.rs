//! Host type tying configuration, tag pattern and warnings together.

use std::error::Error;
use std::path::Path;

use console::Term;
use mdtag_config::PreprocessorConfig;
use regex::Regex;

use crate::batch::{self, BatchError, BatchSummary, DEFAULT_LOG_MESSAGE};
use crate::invoker::{self, DEFAULT_FAIL_MESSAGE, TagError};
use crate::options::{self, OptionError, TagOptions};
use crate::tag::Tag;
use crate::warning::{UserOutput, Warning, WarningSink};

/// A tag preprocessor over a working directory.
///
/// Concrete preprocessors supply the tag pattern and a handler per tag; this
/// type runs the handler over every document, isolates tag failures, and
/// reports them.
///
/// # Example
///
/// ```no_run
/// use mdtag::{Preprocessor, PreprocessorConfig, Tag, TagError};
/// use regex::Regex;
///
/// let pattern = Regex::new(r"<shout>(.*?)</shout>").unwrap();
/// let preprocessor = Preprocessor::new(PreprocessorConfig::new("docs"), pattern);
///
/// let summary = preprocessor
///     .apply(|tag: &Tag<'_>| -> Result<String, TagError> {
///         Ok(tag.get(1).unwrap_or_default().to_uppercase())
///     })
///     .unwrap();
/// println!("rewrote {} files", summary.files_rewritten);
/// ```
pub struct Preprocessor<O = Term> {
    config: PreprocessorConfig,
    pattern: Regex,
    sink: WarningSink<O>,
}

impl Preprocessor<Term> {
    /// Create a preprocessor that shows warnings on stdout.
    #[must_use]
    pub fn new(config: PreprocessorConfig, pattern: Regex) -> Self {
        let sink = WarningSink::stdout(config.debug, config.quiet)
            .with_context_limit(config.context_limit);
        Self {
            config,
            pattern,
            sink,
        }
    }

    /// Parse a tag's attribute string. See [`get_options`](crate::get_options).
    ///
    /// # Errors
    ///
    /// Returns [`OptionError`] if a value cannot be decoded.
    pub fn get_options(options_string: &str) -> Result<TagOptions, OptionError> {
        options::get_options(options_string)
    }
}

impl<O: UserOutput> Preprocessor<O> {
    /// Replace the user-facing output for warnings.
    #[must_use]
    pub fn with_output<P: UserOutput>(self, output: P) -> Preprocessor<P> {
        let sink = WarningSink::new(self.config.debug, self.config.quiet, output)
            .with_context_limit(self.config.context_limit);
        Preprocessor {
            config: self.config,
            pattern: self.pattern,
            sink,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.config.working_dir
    }

    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    #[must_use]
    pub fn sink(&self) -> &WarningSink<O> {
        &self.sink
    }

    #[must_use]
    pub fn output(&self) -> &O {
        self.sink.output()
    }

    /// Context excerpt for a tag, using the configured limit.
    #[must_use]
    pub fn get_tag_context(&self, tag: &Tag<'_>, full_tag: bool) -> String {
        tag.location().context(self.config.context_limit, full_tag)
    }

    /// Report a warning.
    ///
    /// `file` is the document the warning refers to, relative to the working
    /// directory; pass `None` outside a batch run.
    pub fn warning(
        &self,
        file: Option<&str>,
        message: &str,
        context: Option<&str>,
        error: Option<&dyn Error>,
    ) {
        let mut warning = Warning::new(message);
        if let Some(context) = context {
            warning = warning.with_context(context);
        }
        if let Some(error) = error {
            warning = warning.with_error(error);
        }
        self.sink.warn(file, &warning);
    }

    /// Wrap a fallible tag handler. See [`allow_fail`](crate::allow_fail).
    pub fn allow_fail<'s, F, E>(
        &'s self,
        message: &'s str,
        handler: F,
    ) -> impl FnMut(&Tag<'_>) -> String + 's
    where
        F: FnMut(&Tag<'_>) -> Result<String, E> + 's,
        E: Into<TagError>,
    {
        invoker::allow_fail(&self.sink, message, handler)
    }

    /// Run `replacer` over every tag in every document of the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] if a document can't be read or written.
    pub fn process_tags_for_all_files<F>(
        &self,
        log_message: &str,
        replacer: F,
    ) -> Result<BatchSummary, BatchError>
    where
        F: FnMut(&Tag<'_>) -> String,
    {
        batch::process_tags_for_all_files(
            &self.config.working_dir,
            &self.config.extensions,
            &self.pattern,
            log_message,
            replacer,
        )
    }

    /// Run a fallible handler over all documents with default messages.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] if a document can't be read or written.
    pub fn apply<F, E>(&self, handler: F) -> Result<BatchSummary, BatchError>
    where
        F: FnMut(&Tag<'_>) -> Result<String, E>,
        E: Into<TagError>,
    {
        let replacer = self.allow_fail(DEFAULT_FAIL_MESSAGE, handler);
        self.process_tags_for_all_files(DEFAULT_LOG_MESSAGE, replacer)
    }
}
