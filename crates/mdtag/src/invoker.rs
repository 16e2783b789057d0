//! Fault isolation for tag handlers.
//!
//! A failing tag must not abort the run or corrupt the document. [`allow_fail`]
//! turns a fallible handler into one that always produces text: on error it
//! reports a warning and leaves the tag as it was.

use crate::tag::Tag;
use crate::warning::{UserOutput, Warning, WarningSink};

/// Error type returned by tag handlers.
pub type TagError = Box<dyn std::error::Error + Send + Sync>;

/// Default message for a failed tag.
pub const DEFAULT_FAIL_MESSAGE: &str = "Failed to process tag. Skipping.";

/// Wrap a fallible tag handler so that failures don't propagate.
///
/// On `Err`, exactly one warning `"{message} {error}"` is sent to `sink`,
/// with the full tag as context and the error attached, and the original tag
/// text is returned unchanged. Failed tags are not retried.
///
/// # Example
///
/// ```
/// use mdtag::{BufferedOutput, Tag, TagError, WarningSink, allow_fail, replace_all};
/// use regex::Regex;
///
/// let sink = WarningSink::new(false, false, BufferedOutput::default());
/// let pattern = Regex::new(r"<num>(.*?)</num>").unwrap();
/// let handler = allow_fail(&sink, "Bad number.", |tag: &Tag<'_>| -> Result<String, TagError> {
///     let n: i64 = tag.get(1).unwrap_or_default().parse()?;
///     Ok((n * 2).to_string())
/// });
///
/// let out = replace_all(&pattern, "<num>2</num> <num>x</num>", None, handler);
/// assert_eq!(out, "4 <num>x</num>");
/// assert_eq!(sink.output().lines().len(), 1);
/// ```
pub fn allow_fail<'s, O, F, E>(
    sink: &'s WarningSink<O>,
    message: &'s str,
    mut handler: F,
) -> impl FnMut(&Tag<'_>) -> String + 's
where
    O: UserOutput,
    F: FnMut(&Tag<'_>) -> Result<String, E> + 's,
    E: Into<TagError>,
{
    move |tag: &Tag<'_>| match handler(tag) {
        Ok(replacement) => replacement,
        Err(err) => {
            let err: TagError = err.into();
            let context = tag.location().context(sink.context_limit(), true);
            let warning = Warning::new(format!("{message} {err}"))
                .with_context(context)
                .with_error(&*err);
            sink.warn(tag.file_name(), &warning);
            tag.as_str().to_owned()
        }
    }
}
