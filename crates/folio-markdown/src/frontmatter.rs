//! YAML front matter at the head of a document segment.
//!
//! A segment carries front matter when its first line is `---`. The block
//! runs until the next `---` (or `...`) line and must be a YAML mapping:
//!
//! ```text
//! ---
//! id: about
//! title: About me
//! data:
//!   role: Engineer
//! ---
//! # About
//! ```

use serde_json::{Map, Value};

/// Front matter attributes.
pub type Attributes = Map<String, Value>;

/// Error type for front matter parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    /// The block is not valid YAML.
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The block parsed, but is not a mapping.
    #[error("front matter must be a mapping, got {0}")]
    NotAMapping(&'static str),
    /// Opening fence without a closing fence.
    #[error("front matter block is not closed")]
    Unterminated,
}

/// Segment split into front matter and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter<'a> {
    /// Parsed attributes (empty when the segment has no front matter).
    pub attributes: Attributes,
    /// Text after the closing fence.
    pub body: &'a str,
}

/// Split front matter from a segment.
///
/// A segment without an opening fence has no attributes and its whole text is
/// the body.
///
/// # Errors
///
/// Returns [`FrontmatterError`] when a fenced block is present but unclosed,
/// malformed, or not a mapping.
pub fn split(segment: &str) -> Result<Frontmatter<'_>, FrontmatterError> {
    let Some(after_open) = strip_fence_line(segment) else {
        return Ok(Frontmatter {
            attributes: Attributes::new(),
            body: segment,
        });
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &after_open[..offset];
            let body = after_open[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Ok(Frontmatter {
                attributes: parse_attributes(yaml)?,
                body,
            });
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Return the text after an opening `---` line, if the segment starts with one.
fn strip_fence_line(segment: &str) -> Option<&str> {
    let (first, rest) = match segment.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (segment, ""),
    };
    (first.trim_end() == "---").then_some(rest)
}

fn parse_attributes(yaml: &str) -> Result<Attributes, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Attributes::new());
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Attributes::new()),
        other => Err(FrontmatterError::NotAMapping(value_kind(&other))),
    }
}

/// Human-readable JSON type name.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_no_fence_keeps_whole_segment() {
        let fm = split("title: Hi\nBody").unwrap();

        assert!(fm.attributes.is_empty());
        assert_eq!(fm.body, "title: Hi\nBody");
    }

    #[test]
    fn test_fenced_mapping() {
        let fm = split("---\nid: about\ntags: [a, b]\n---\n\n# About").unwrap();

        assert_eq!(fm.attributes.get("id"), Some(&json!("about")));
        assert_eq!(fm.attributes.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(fm.body, "# About");
    }

    #[test]
    fn test_nested_data() {
        let fm = split("---\ndata:\n  role: Engineer\n  years: 5\n---\nx").unwrap();

        assert_eq!(
            fm.attributes.get("data"),
            Some(&json!({"role": "Engineer", "years": 5}))
        );
    }

    #[test]
    fn test_empty_block() {
        let fm = split("---\n---\nBody").unwrap();

        assert!(fm.attributes.is_empty());
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_dots_close_block() {
        let fm = split("---\na: 1\n...\nBody").unwrap();

        assert_eq!(fm.attributes.get("a"), Some(&json!(1)));
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_crlf_line_endings() {
        let fm = split("---\r\ntitle: Hi\r\n---\r\nBody").unwrap();

        assert_eq!(fm.attributes.get("title"), Some(&json!("Hi")));
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_unterminated() {
        let err = split("---\ntitle: Hi\nBody").unwrap_err();
        assert!(matches!(err, FrontmatterError::Unterminated));
    }

    #[test]
    fn test_not_a_mapping() {
        let err = split("---\n- a\n- b\n---\nBody").unwrap_err();

        assert!(matches!(err, FrontmatterError::NotAMapping("array")));
        assert_eq!(err.to_string(), "front matter must be a mapping, got array");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = split("---\ntitle: [unclosed\n---\nBody").unwrap_err();
        assert!(matches!(err, FrontmatterError::Yaml(_)));
    }

    #[test]
    fn test_fence_must_be_first_line() {
        let fm = split("Intro\n---\na: 1\n---").unwrap();

        assert!(fm.attributes.is_empty());
        assert_eq!(fm.body, "Intro\n---\na: 1\n---");
    }
}
