//! Tag matches handed to replacement callbacks.

use std::ops::Range;
use std::path::Path;

use regex::{Captures, Regex};

use crate::context::get_tag_context;

/// Location of a match inside its source text.
///
/// Offsets are byte offsets that always fall on char boundaries, with
/// `start <= end <= source.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch<'s> {
    source: &'s str,
    start: usize,
    end: usize,
}

impl<'s> TagMatch<'s> {
    /// Create a match location over `source[start..end]`.
    ///
    /// Returns `None` if the span is out of bounds, reversed, or splits a
    /// UTF-8 sequence.
    ///
    /// # Example
    ///
    /// ```
    /// use mdtag::TagMatch;
    ///
    /// let m = TagMatch::new("say <b>hi</b>", 4, 13).unwrap();
    /// assert_eq!(m.as_str(), "<b>hi</b>");
    /// assert!(TagMatch::new("abc", 2, 1).is_none());
    /// ```
    #[must_use]
    pub fn new(source: &'s str, start: usize, end: usize) -> Option<Self> {
        if start > end
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            return None;
        }
        Some(Self { source, start, end })
    }

    /// Create a match location from a regex match found in `source`.
    ///
    /// Returns `None` if the match does not fit inside `source`.
    #[must_use]
    pub fn from_regex(source: &'s str, m: regex::Match<'_>) -> Option<Self> {
        Self::new(source, m.start(), m.end())
    }

    /// Full text the match was found in.
    #[must_use]
    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Byte offset where the match starts.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset where the match ends (exclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Byte range of the match.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Matched text.
    #[must_use]
    pub fn as_str(&self) -> &'s str {
        &self.source[self.start..self.end]
    }

    /// Readable excerpt around the match. See [`get_tag_context`].
    #[must_use]
    pub fn context(&self, limit: usize, full_tag: bool) -> String {
        get_tag_context(self, limit, full_tag)
    }
}

/// The document currently being processed by a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentFile<'a> {
    /// Path relative to the working directory, used to prefix diagnostics.
    pub name: &'a str,
    /// Full path of the file on disk.
    pub path: &'a Path,
}

/// A single tag found by the tag pattern.
#[derive(Debug)]
pub struct Tag<'h> {
    haystack: &'h str,
    captures: Captures<'h>,
    file: Option<CurrentFile<'h>>,
}

impl<'h> Tag<'h> {
    /// Entire matched text (group 0).
    #[must_use]
    pub fn as_str(&self) -> &'h str {
        self.captures.get(0).map_or("", |m| m.as_str())
    }

    /// Text of a numbered capture group.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'h str> {
        self.captures.get(index).map(|m| m.as_str())
    }

    /// Text of a named capture group.
    #[must_use]
    pub fn name(&self, group: &str) -> Option<&'h str> {
        self.captures.name(group).map(|m| m.as_str())
    }

    /// Underlying regex captures.
    #[must_use]
    pub fn captures(&self) -> &Captures<'h> {
        &self.captures
    }

    /// Location of the whole match inside the document.
    #[must_use]
    pub fn location(&self) -> TagMatch<'h> {
        let range = self.captures.get(0).map_or(0..0, |m| m.range());
        TagMatch {
            source: self.haystack,
            start: range.start,
            end: range.end,
        }
    }

    /// File being processed, if the tag comes from a batch run.
    #[must_use]
    pub fn file(&self) -> Option<CurrentFile<'h>> {
        self.file
    }

    /// Path of the file relative to the working directory.
    #[must_use]
    pub fn file_name(&self) -> Option<&'h str> {
        self.file.map(|f| f.name)
    }

    /// Full path of the file being processed.
    #[must_use]
    pub fn path(&self) -> Option<&'h Path> {
        self.file.map(|f| f.path)
    }
}

/// Replace every non-overlapping match of `pattern` in `haystack`.
///
/// Works like [`Regex::replace_all`], except the callback receives a [`Tag`]
/// that also knows its haystack and the file it came from.
///
/// # Example
///
/// ```
/// use mdtag::{Tag, replace_all};
/// use regex::Regex;
///
/// let pattern = Regex::new(r"<up>(.*?)</up>").unwrap();
/// let out = replace_all(&pattern, "a <up>b</up> c", None, |tag: &Tag<'_>| {
///     tag.get(1).unwrap_or_default().to_uppercase()
/// });
/// assert_eq!(out, "a B c");
/// ```
pub fn replace_all<'h, F>(
    pattern: &Regex,
    haystack: &'h str,
    file: Option<CurrentFile<'h>>,
    mut replacer: F,
) -> String
where
    F: FnMut(&Tag<'h>) -> String,
{
    let mut result = String::with_capacity(haystack.len());
    let mut last = 0;

    for captures in pattern.captures_iter(haystack) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let (start, end) = (whole.start(), whole.end());
        result.push_str(&haystack[last..start]);

        let tag = Tag {
            haystack,
            captures,
            file,
        };
        result.push_str(&replacer(&tag));
        last = end;
    }

    result.push_str(&haystack[last..]);
    result
}
