//! Component invocations embedded in markdown.
//!
//! Two forms share one tag syntax:
//!
//! - Inline: `{{Avatar src="me.png" size=large}}`
//! - Block: `{{Highlight color=accent}}text{{/Highlight}}`
//!
//! Component names start with an uppercase letter. Lowercase tokens such as
//! `{{profile.name}}` are variable placeholders and stay in the text.

mod props;

pub use props::{PropValue, Props, parse_props};

/// A component call found in text.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInvocation {
    /// Component name (e.g. `Avatar`).
    pub name: String,
    /// Parsed properties.
    pub props: Props,
    /// Raw text between open and close tags; `None` for inline calls.
    ///
    /// Children are not expanded further.
    pub children: Option<String>,
}

/// One piece of expanded text, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// Markdown text, verbatim (variable placeholders included).
    Text {
        /// Raw text.
        raw: String,
    },
    /// Component call.
    Component(ComponentInvocation),
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text { raw: raw.into() }
    }
}

/// Open tag found at some position.
struct OpenTag<'a> {
    name: &'a str,
    props: &'a str,
    /// Byte length of the whole tag, including braces.
    len: usize,
}

/// Expand component invocations in `text`.
///
/// Scans left to right. At each open tag the block form is tried first (the
/// first matching `{{/Name}}` later in the text); otherwise the tag is inline.
/// Text without components yields a single [`ContentPart::Text`] equal to the
/// input.
#[must_use]
pub fn expand(text: &str) -> Vec<ContentPart> {
    let mut parts = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(found) = text[pos..].find("{{") {
        let start = pos + found;
        let Some(tag) = parse_open_tag(&text[start..]) else {
            pos = start + 2;
            continue;
        };

        let tag_end = start + tag.len;
        let close = format!("{{{{/{}}}}}", tag.name);
        let (children, end) = match text[tag_end..].find(&close) {
            Some(offset) => (
                Some(text[tag_end..tag_end + offset].to_owned()),
                tag_end + offset + close.len(),
            ),
            None => (None, tag_end),
        };

        if start > text_start {
            parts.push(ContentPart::text(&text[text_start..start]));
        }
        parts.push(ContentPart::Component(ComponentInvocation {
            name: tag.name.to_owned(),
            props: parse_props(tag.props),
            children,
        }));

        text_start = end;
        pos = end;
    }

    if text_start < text.len() || parts.is_empty() {
        parts.push(ContentPart::text(&text[text_start..]));
    }

    parts
}

/// Parse `{{Name props}}` at the start of `input`.
fn parse_open_tag(input: &str) -> Option<OpenTag<'_>> {
    let after = input.strip_prefix("{{")?;
    if !after.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let name_end = after
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after.len());
    let name = &after[..name_end];
    let rest = &after[name_end..];

    if rest.starts_with("}}") {
        return Some(OpenTag {
            name,
            props: "",
            len: 2 + name_end + 2,
        });
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let close = find_tag_close(rest)?;
    Some(OpenTag {
        name,
        props: rest[..close].trim(),
        len: 2 + name_end + close + 2,
    })
}

/// Find the `}}` ending a tag, skipping quoted values and `{var}` references.
///
/// Quotes only open a value directly after `=`; elsewhere they are literal.
fn find_tag_close(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut quote = None;
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' if i > 0 && bytes[i - 1] == b'=' => quote = Some(b),
                b'{' => depth += 1,
                b'}' if depth > 0 => depth -= 1,
                b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
                b'\n' if bytes.get(i + 1) == Some(&b'\n') => return None,
                _ => {}
            },
        }
        i += 1;
    }
    None
}
