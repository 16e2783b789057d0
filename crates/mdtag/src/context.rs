//! Bounded excerpts around a match, for diagnostics.
//!
//! Limits count characters, not bytes, so an excerpt never splits a
//! multi-byte character.

use crate::tag::TagMatch;

pub use mdtag_config::DEFAULT_CONTEXT_LIMIT;

/// Placeholder for the elided middle of a long tag.
const ELIDED: &str = " <...> ";

/// Marker for text cut off at either end of the excerpt.
const ELLIPSIS: &str = "...";

/// Get a readable excerpt around a match.
///
/// Returns up to `limit` characters before the match, the match itself, and
/// up to `limit` characters after it. `...` marks an excerpt that doesn't
/// reach the start or end of the source.
///
/// If the match is longer than `limit` characters and `full_tag` is false,
/// only its first and last `limit / 2` characters are kept, joined by `<...>`.
///
/// # Example
///
/// ```
/// use mdtag::{TagMatch, get_tag_context};
///
/// let m = TagMatch::new("0123456789ABCDEFGHIJ", 5, 15).unwrap();
/// assert_eq!(get_tag_context(&m, 3, true), "...23456789ABCDEFGH...");
/// assert_eq!(get_tag_context(&m, 3, false), "...2345 <...> EFGH...");
/// ```
#[must_use]
pub fn get_tag_context(tag: &TagMatch<'_>, limit: usize, full_tag: bool) -> String {
    let source = tag.source();
    let start = chars_back(source, tag.start(), limit);
    let end = chars_forward(source, tag.end(), limit);

    let mut result = String::with_capacity(end - start + ELIDED.len() + 2 * ELLIPSIS.len());
    if start != 0 {
        result.push_str(ELLIPSIS);
    }

    if !full_tag && tag.as_str().chars().count() > limit {
        let half = limit / 2;
        let head_end = chars_forward(source, tag.start(), half);
        let tail_start = chars_back(source, tag.end(), half);
        result.push_str(&source[start..head_end]);
        result.push_str(ELIDED);
        result.push_str(&source[tail_start..end]);
    } else {
        result.push_str(&source[start..end]);
    }

    if end != source.len() {
        result.push_str(ELLIPSIS);
    }
    result
}

/// Byte offset `n` characters after `from`, clamped to the end of `source`.
fn chars_forward(source: &str, from: usize, n: usize) -> usize {
    source[from..]
        .char_indices()
        .nth(n)
        .map_or(source.len(), |(i, _)| from + i)
}

/// Byte offset `n` characters before `from`, clamped to the start of `source`.
fn chars_back(source: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    source[..from]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DIGITS: &str = "0123456789ABCDEFGHIJ";

    fn context(source: &str, start: usize, end: usize, limit: usize, full_tag: bool) -> String {
        let m = TagMatch::new(source, start, end).unwrap();
        get_tag_context(&m, limit, full_tag)
    }

    #[test]
    fn test_whole_source_fits() {
        assert_eq!(context("a <t>x</t> b", 2, 10, 100, false), "a <t>x</t> b");
    }

    #[test]
    fn test_cropped_both_sides_full_tag() {
        assert_eq!(context(DIGITS, 5, 15, 3, true), "...23456789ABCDEFGH...");
    }

    #[test]
    fn test_long_tag_truncated() {
        assert_eq!(context(DIGITS, 5, 15, 3, false), "...2345 <...> EFGH...");
    }

    #[test]
    fn test_short_tag_not_truncated() {
        assert_eq!(context(DIGITS, 5, 7, 3, false), "...23456789...");
    }

    #[test]
    fn test_match_at_start() {
        assert_eq!(context(DIGITS, 0, 2, 3, false), "01234...");
    }

    #[test]
    fn test_match_at_end() {
        assert_eq!(context(DIGITS, 18, 20, 3, false), "...FGHIJ");
    }

    #[test]
    fn test_zero_limit() {
        // Any non-empty tag is longer than a zero limit and collapses entirely
        assert_eq!(context(DIGITS, 5, 7, 0, false), "... <...> ...");
        assert_eq!(context(DIGITS, 5, 7, 0, true), "...56...");
    }

    #[test]
    fn test_empty_match() {
        assert_eq!(context(DIGITS, 10, 10, 2, false), "...89AB...");
        assert_eq!(context("", 0, 0, 5, false), "");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let source = "ääää<t/>öööö";
        let start = source.find('<').unwrap();
        let end = start + "<t/>".len();
        assert_eq!(context(source, start, end, 2, true), "...ää<t/>öö...");
    }

    #[test]
    fn test_long_tag_truncated_on_character_boundaries() {
        let source = "ääää<tag>öööööö</tag>üüüü";
        let start = source.find('<').unwrap();
        let end = source.rfind('>').unwrap() + 1;
        assert_eq!(context(source, start, end, 4, false), "ääää<t <...> g>üüüü");
        assert_eq!(context(source, start, end, 2, false), "...ää< <...> >üü...");
        assert_eq!(context(source, start, end, 3, false), "...äää< <...> >üüü...");
    }

    #[test]
    fn test_excerpt_stays_within_bounds() {
        for limit in 0..12 {
            for start in 0..DIGITS.len() {
                for end in start..=DIGITS.len() {
                    let excerpt = context(DIGITS, start, end, limit, false);
                    let body = excerpt
                        .trim_start_matches(ELLIPSIS)
                        .trim_end_matches(ELLIPSIS)
                        .replace(ELIDED, "");
                    let lo = start.saturating_sub(limit);
                    let hi = (end + limit).min(DIGITS.len());
                    assert!(body.chars().all(|c| DIGITS[lo..hi].contains(c)));
                    let max_len = 2 * limit + (end - start) + ELIDED.len() + 2 * ELLIPSIS.len();
                    assert!(excerpt.len() <= max_len);
                }
            }
        }
    }
}
