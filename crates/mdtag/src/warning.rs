//! Warning sink for non-fatal preprocessing problems.
//!
//! Every warning is logged in full through `tracing`. Users see a short line
//! on the terminal, or the full text with context and error details in debug
//! mode. Quiet mode hides the terminal line but still logs.

use std::cell::RefCell;
use std::error::Error;
use std::fmt::Write as _;

use console::{Style, Term};

use crate::context::DEFAULT_CONTEXT_LIMIT;

/// Prefix for lines written to the user-facing stream.
const WARNING_PREFIX: &str = "WARNING: ";

/// User-facing output stream for warnings.
pub trait UserOutput {
    /// Write one warning. Must not fail or panic.
    fn write_warning(&self, text: &str);
}

impl UserOutput for Term {
    fn write_warning(&self, text: &str) {
        let style = Style::new().yellow();
        let _ = self.write_line(&style.apply_to(text).to_string());
    }
}

/// Output that keeps warnings in memory.
///
/// Useful for hosts that report warnings themselves, and for tests.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    lines: RefCell<Vec<String>>,
}

impl BufferedOutput {
    /// Warnings written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Remove and return the warnings written so far.
    pub fn take(&self) -> Vec<String> {
        self.lines.take()
    }
}

impl UserOutput for BufferedOutput {
    fn write_warning(&self, text: &str) {
        self.lines.borrow_mut().push(text.to_owned());
    }
}

/// A single diagnostic.
///
/// # Example
///
/// ```
/// use mdtag::Warning;
///
/// let warning = Warning::new("Unknown option").with_context("<include src=x>");
/// assert_eq!(warning.short_form(Some("guide.md")), "[guide.md] Unknown option\n");
/// assert!(warning.long_form(None).contains("Context:\n---\n<include src=x>\n---\n"));
/// ```
#[derive(Debug)]
pub struct Warning<'a> {
    message: String,
    context: Option<String>,
    error: Option<&'a (dyn Error + 'a)>,
}

impl<'a> Warning<'a> {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            error: None,
        }
    }

    /// Attach a context excerpt. An empty excerpt is ignored.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.is_empty()).then_some(context);
        self
    }

    /// Attach the error that caused the warning.
    #[must_use]
    pub fn with_error(mut self, error: &'a (dyn Error + 'a)) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Message prefixed with the current file, if any.
    #[must_use]
    pub fn short_form(&self, file: Option<&str>) -> String {
        match file {
            Some(name) if !name.is_empty() => format!("[{name}] {}\n", self.message),
            _ => format!("{}\n", self.message),
        }
    }

    /// Short form followed by the context block and the error chain.
    ///
    /// Missing context or error simply omit their block.
    #[must_use]
    pub fn long_form(&self, file: Option<&str>) -> String {
        let mut text = self.short_form(file);
        if let Some(context) = &self.context {
            let _ = write!(text, "Context:\n---\n{context}\n---\n");
        }
        if let Some(error) = self.error {
            text.push_str(&error_report(error));
        }
        text
    }
}

/// Render an error and its `source()` chain.
fn error_report(error: &dyn Error) -> String {
    let mut report = format!("Error: {error}\n");
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = writeln!(report, "Caused by: {cause}");
        source = cause.source();
    }
    report
}

/// Emits warnings to the log and to a user-facing output.
pub struct WarningSink<O = Term> {
    debug: bool,
    quiet: bool,
    context_limit: usize,
    output: O,
}

impl WarningSink<Term> {
    /// Sink writing user-facing warnings to stdout.
    #[must_use]
    pub fn stdout(debug: bool, quiet: bool) -> Self {
        Self::new(debug, quiet, Term::stdout())
    }
}

impl<O: UserOutput> WarningSink<O> {
    #[must_use]
    pub fn new(debug: bool, quiet: bool, output: O) -> Self {
        Self {
            debug,
            quiet,
            context_limit: DEFAULT_CONTEXT_LIMIT,
            output,
        }
    }

    /// Set the context limit used for tag excerpts.
    #[must_use]
    pub fn with_context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    #[must_use]
    pub fn context_limit(&self) -> usize {
        self.context_limit
    }

    #[must_use]
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Emit a warning.
    ///
    /// `file` is the document being processed, relative to the working
    /// directory; `None` outside a batch run.
    pub fn warn(&self, file: Option<&str>, warning: &Warning<'_>) {
        let long = warning.long_form(file);
        tracing::warn!(file = file.unwrap_or_default(), "{}", long.trim_end());

        if self.quiet {
            return;
        }
        let shown = if self.debug {
            long
        } else {
            warning.short_form(file)
        };
        self.output
            .write_warning(&format!("{WARNING_PREFIX}{}", shown.trim_end()));
    }
}
