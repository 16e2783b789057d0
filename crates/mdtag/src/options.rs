//! Tag option parsing.
//!
//! Parses XML-like attribute strings such as `title="Intro" depth="2"` into
//! typed values. Each value is decoded as a YAML scalar: `true`/`false` become
//! booleans, numeric literals become integers or floats, anything else stays a
//! string.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Attribute grammar: `key="value"` or `key='value'`, values may span lines.
static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][0-9A-Za-z_:.\-]*)=(?:"(.*?)"|'(.*?)')"#).unwrap()
});

/// A typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ScalarValue {
    /// String contents, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as a float. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Error decoding a single scalar literal.
#[derive(Debug, thiserror::Error)]
pub enum ScalarError {
    /// The literal is not valid YAML.
    #[error("cannot decode \"{value}\": {source}")]
    Yaml {
        value: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Error parsing an option string.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    #[error("invalid value for option \"{key}\": {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: ScalarError,
    },
}

/// Decode a raw attribute value as a YAML scalar.
///
/// Anything that isn't a boolean or a number is kept as a string. Empty and
/// null literals (`""`, `null`, `~`), and prose that YAML would read as a
/// mapping or sequence (`Step 1: install`, `- first`), keep the raw text.
///
/// # Errors
///
/// Returns [`ScalarError`] if the value is not valid YAML.
///
/// # Example
///
/// ```
/// use mdtag::{ScalarValue, decode_scalar};
///
/// assert_eq!(decode_scalar("true").unwrap(), ScalarValue::Bool(true));
/// assert_eq!(decode_scalar("42").unwrap(), ScalarValue::Int(42));
/// assert_eq!(decode_scalar("1.5").unwrap(), ScalarValue::Float(1.5));
/// assert_eq!(decode_scalar("hello").unwrap(), ScalarValue::String("hello".into()));
/// ```
pub fn decode_scalar(raw: &str) -> Result<ScalarValue, ScalarError> {
    if raw.trim().is_empty() {
        return Ok(ScalarValue::String(raw.to_owned()));
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(|source| ScalarError::Yaml {
            value: raw.to_owned(),
            source,
        })?;

    match value {
        serde_yaml::Value::Bool(b) => Ok(ScalarValue::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(ScalarValue::Int(i))
            } else {
                Ok(n.as_f64()
                    .map_or_else(|| ScalarValue::String(raw.to_owned()), ScalarValue::Float))
            }
        }
        serde_yaml::Value::String(s) => Ok(ScalarValue::String(s)),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_)
        | serde_yaml::Value::Tagged(_) => Ok(ScalarValue::String(raw.to_owned())),
    }
}

/// Typed options parsed from a tag's attribute string.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TagOptions {
    values: BTreeMap<String, ScalarValue>,
}

impl TagOptions {
    /// Get an option value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ScalarValue::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ScalarValue::as_bool)
    }

    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ScalarValue::as_i64)
    }

    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ScalarValue::as_f64)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Parse an attribute string into typed options.
///
/// Both quote styles are accepted and values may span lines. When a key
/// appears more than once, the last value wins.
///
/// # Errors
///
/// Returns [`OptionError`] if a value cannot be decoded. Decoding stops at
/// the first bad value.
///
/// # Example
///
/// ```
/// use mdtag::get_options;
///
/// let options = get_options(r#"title="Intro" depth='2' draft="false""#).unwrap();
/// assert_eq!(options.get_str("title"), Some("Intro"));
/// assert_eq!(options.get_i64("depth"), Some(2));
/// assert_eq!(options.get_bool("draft"), Some(false));
/// ```
pub fn get_options(options_string: &str) -> Result<TagOptions, OptionError> {
    let mut options = TagOptions::default();
    if options_string.is_empty() {
        return Ok(options);
    }

    for caps in OPTION_RE.captures_iter(options_string) {
        let key = &caps[1];
        let raw = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        let value = decode_scalar(raw).map_err(|source| OptionError::InvalidValue {
            key: key.to_owned(),
            source,
        })?;
        options.values.insert(key.to_owned(), value);
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_string() {
        let options = get_options("").unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_typed_values() {
        let options = get_options(r#"a="1" b="true" c="x""#).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options.get("a"), Some(&ScalarValue::Int(1)));
        assert_eq!(options.get("b"), Some(&ScalarValue::Bool(true)));
        assert_eq!(options.get("c"), Some(&ScalarValue::String("x".to_owned())));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let options = get_options(r#"a="1" a="2""#).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options.get_i64("a"), Some(2));
    }

    #[test]
    fn test_single_quotes() {
        let options = get_options("title='Hello World'").unwrap();
        assert_eq!(options.get_str("title"), Some("Hello World"));
    }

    #[test]
    fn test_mixed_quotes_keep_inner_quote() {
        let options = get_options(r#"a='say "hi"' b="it's""#).unwrap();
        assert_eq!(options.get_str("a"), Some("say \"hi\""));
        assert_eq!(options.get_str("b"), Some("it's"));
    }

    #[test]
    fn test_float() {
        let options = get_options(r#"scale="0.5""#).unwrap();
        assert_eq!(options.get("scale"), Some(&ScalarValue::Float(0.5)));
        assert_eq!(options.get_f64("scale"), Some(0.5));
    }

    #[test]
    fn test_key_grammar() {
        let options = get_options(r#"xml:lang="en" data-id="7" _private.x="y""#).unwrap();
        assert_eq!(options.get_str("xml:lang"), Some("en"));
        assert_eq!(options.get_i64("data-id"), Some(7));
        assert_eq!(options.get_str("_private.x"), Some("y"));
    }

    #[test]
    fn test_multiline_value() {
        let options = get_options("text=\"first\nsecond\"").unwrap();
        assert!(options.contains("text"));
        assert_eq!(options.get_str("text"), Some("first second"));
    }

    #[test]
    fn test_empty_value_is_empty_string() {
        let options = get_options(r#"alt="""#).unwrap();
        assert_eq!(options.get_str("alt"), Some(""));
    }

    #[test]
    fn test_text_without_attributes() {
        let options = get_options("just some words").unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_unquoted_values_ignored() {
        let options = get_options(r#"width=560 title="x""#).unwrap();
        assert_eq!(options.len(), 1);
        assert!(!options.contains("width"));
    }

    #[test]
    fn test_prose_values_stay_strings() {
        let options = get_options(r#"title="Step 1: install" caption="- first""#).unwrap();
        assert_eq!(options.get_str("title"), Some("Step 1: install"));
        assert_eq!(options.get_str("caption"), Some("- first"));
    }

    #[test]
    fn test_iter_in_key_order() {
        let options = get_options(r#"zeta="1" alpha="2" mid="3""#).unwrap();
        let keys: Vec<&str> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let err = get_options(r#"a="[unclosed""#).unwrap_err();
        assert!(err.to_string().contains("invalid value for option \"a\""));
        let OptionError::InvalidValue { key, source } = err;
        assert_eq!(key, "a");
        assert!(matches!(source, ScalarError::Yaml { .. }));
    }

    #[test]
    fn test_decode_null_keeps_raw() {
        assert_eq!(
            decode_scalar("null").unwrap(),
            ScalarValue::String("null".to_owned())
        );
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(ScalarValue::Bool(true).to_string(), "true");
        assert_eq!(ScalarValue::Int(-3).to_string(), "-3");
        assert_eq!(ScalarValue::Float(2.5).to_string(), "2.5");
        assert_eq!(ScalarValue::String("x".into()).to_string(), "x");
    }

    #[test]
    fn test_accessors_reject_other_types() {
        let value = ScalarValue::String("1".to_owned());
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.as_bool(), None);
        assert_eq!(ScalarValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(ScalarValue::Int(2).as_str(), None);
    }
}
