//! Component property parsing.
//!
//! Grammar, whitespace separated:
//!
//! - `key="quoted value"` (or single quotes)
//! - `key=bare` (`true`/`false` become booleans, numbers become numbers)
//! - `key={dotted.path}` (resolved against page data at render time)
//!
//! Fragments that don't fit the grammar are skipped.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// String literal.
    String(String),
    /// Boolean literal.
    Bool(bool),
    /// Numeric literal.
    Number(Number),
    /// Reference into page data, resolved during composition.
    Variable {
        /// Dotted path (e.g. `profile.avatar`).
        path: String,
    },
}

impl PropValue {
    /// Convert a literal to JSON. Variables have no literal value.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Number(n) => Some(Value::Number(n.clone())),
            Self::Variable { .. } => None,
        }
    }

    fn from_bare(word: &str) -> Self {
        match word {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => parse_number(word).map_or_else(|| Self::String(word.to_owned()), Self::Number),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Parsed properties, keyed by name.
pub type Props = BTreeMap<String, PropValue>;

fn parse_number(word: &str) -> Option<Number> {
    if let Ok(n) = word.parse::<i64>() {
        return Some(Number::from(n));
    }
    // Only plain decimal literals; "inf", "NaN" and friends stay strings.
    if !word
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }
    word.parse::<f64>().ok().and_then(Number::from_f64)
}

fn is_key_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Parse a property string such as `src="a.png" size=large loop=true`.
#[must_use]
pub fn parse_props(input: &str) -> Props {
    let mut props = Props::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        match parse_prop(rest) {
            Some((key, value, consumed)) => {
                if let Some(value) = value {
                    props.insert(key.to_owned(), value);
                }
                rest = &rest[consumed..];
            }
            None => {
                // Skip the malformed fragment up to the next whitespace.
                let skip = rest.find(char::is_whitespace).unwrap_or(rest.len());
                rest = &rest[skip..];
            }
        }
    }

    props
}

/// Parse one `key=value` at the start of `input`.
///
/// Returns the key, the value (`None` when it is unusable but the fragment
/// was still consumed), and the number of bytes consumed.
fn parse_prop(input: &str) -> Option<(&str, Option<PropValue>, usize)> {
    if !input.starts_with(is_key_start) {
        return None;
    }
    let key_end = input.find(|c: char| !is_key_char(c)).unwrap_or(input.len());
    let key = &input[..key_end];
    let after_eq = input[key_end..].strip_prefix('=')?;
    let value_start = key_end + 1;

    let mut chars = after_eq.chars();
    match chars.next()? {
        quote @ ('"' | '\'') => {
            let inner = &after_eq[1..];
            let end = inner.find(quote)?;
            let consumed = value_start + 1 + end + 1;
            Some((key, Some(PropValue::String(inner[..end].to_owned())), consumed))
        }
        '{' => {
            let inner = &after_eq[1..];
            let end = inner.find('}')?;
            let path = inner[..end].trim();
            let consumed = value_start + 1 + end + 1;
            let value = (!path.is_empty()).then(|| PropValue::Variable {
                path: path.to_owned(),
            });
            Some((key, value, consumed))
        }
        c if c.is_whitespace() => None,
        _ => {
            let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
            let word = &after_eq[..end];
            Some((key, Some(PropValue::from_bare(word)), value_start + end))
        }
    }
}
