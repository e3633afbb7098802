//! Document parsing: settings block and pages.
//!
//! A document is split into segments on delimiter lines made of four or more
//! `=` characters. A delimiter may embed a page id in brackets, which applies
//! to the segment that follows it:
//!
//! ```text
//! ---
//! type: settings
//! defaultTemplate: portfolio
//! sharedData:
//!   name: Ada
//! ---
//! ====[about]====
//! # About {{name}}
//! ====
//! # Projects
//! ```
//!
//! A segment whose front matter has `type: settings` becomes the document's
//! [`SettingsBlock`]; all other segments become [`Page`]s in input order.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::frontmatter::{self, Attributes, FrontmatterError};

/// Document-wide defaults from the settings segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsBlock {
    /// Template used by pages that don't name one (`defaultTemplate`).
    pub default_template: Option<String>,
    /// Layout used by pages that don't name one (`defaultLayout`).
    pub default_layout: Option<String>,
    /// Data shared by every page (`sharedData`).
    pub shared_data: Map<String, Value>,
    /// Components declared for the whole document (`components`).
    pub components: Vec<String>,
    /// All other front matter keys, verbatim.
    pub extra: Attributes,
}

impl SettingsBlock {
    fn from_attributes(mut attributes: Attributes) -> Self {
        let default_template = take_string(&mut attributes, "defaultTemplate");
        let default_layout = take_string(&mut attributes, "defaultLayout");
        let shared_data = match attributes.remove("sharedData") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let components = string_list(attributes.remove("components"));

        Self {
            default_template,
            default_layout,
            shared_data,
            components,
            extra: attributes,
        }
    }
}

/// One page of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page id (explicit `id`, delimiter tag, or `page-{ordinal}`).
    pub id: String,
    /// Front matter attributes.
    pub frontmatter: Attributes,
    /// Markdown body after the front matter.
    pub body: String,
    /// 1-based position among the document's pages.
    pub ordinal: usize,
}

impl Page {
    /// Page title from front matter.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.str_attr("title")
    }

    /// String front matter value.
    #[must_use]
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.frontmatter.get(key).and_then(Value::as_str)
    }
}

/// Recoverable problem found while parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseWarning {
    /// A segment's front matter could not be parsed.
    #[error("segment {segment}: {source}")]
    Frontmatter {
        /// 1-based segment index.
        segment: usize,
        /// Underlying error.
        #[source]
        source: FrontmatterError,
    },
    /// A second settings segment was ignored.
    #[error("segment {segment}: additional settings block ignored")]
    ExtraSettings {
        /// 1-based segment index.
        segment: usize,
    },
    /// Several pages share one id.
    #[error("duplicate page id '{id}'; the last page with this id is used")]
    DuplicateId {
        /// Shared id.
        id: String,
    },
}

/// Result of [`parse`].
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Settings block, if the document has one.
    pub settings: Option<SettingsBlock>,
    /// Pages in input order.
    pub pages: Vec<Page>,
    /// Recovered problems.
    pub warnings: Vec<ParseWarning>,
}

impl ParsedDocument {
    /// Look up a page by id.
    ///
    /// When several pages share the id, the last one wins.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().rev().find(|page| page.id == id)
    }

    /// Page selected by an optional id: the matching page, else the first.
    #[must_use]
    pub fn select(&self, id: Option<&str>) -> Option<&Page> {
        id.and_then(|id| self.page(id))
            .or_else(|| self.pages.first())
    }
}

/// Parse a raw markdown document.
///
/// Never fails: malformed front matter and extra settings blocks are
/// recorded in [`ParsedDocument::warnings`].
#[must_use]
pub fn parse(raw: &str) -> ParsedDocument {
    let segments = split_segments(raw);
    let mut doc = ParsedDocument::default();

    let Some(segments) = segments else {
        // No delimiters: the whole document is a single page.
        let (attributes, body) = split_frontmatter(raw.trim(), 1, &mut doc.warnings);
        let id = explicit_id(&attributes).unwrap_or_else(|| "page-1".to_owned());
        doc.pages.push(Page {
            id,
            frontmatter: attributes,
            body: body.to_owned(),
            ordinal: 1,
        });
        return doc;
    };

    for (index, segment) in segments.into_iter().enumerate() {
        let number = index + 1;
        let (attributes, body) = split_frontmatter(segment.text, number, &mut doc.warnings);

        if attributes.get("type").and_then(Value::as_str) == Some("settings") {
            if doc.settings.is_some() {
                tracing::warn!(segment = number, "Ignoring additional settings block");
                doc.warnings.push(ParseWarning::ExtraSettings { segment: number });
            } else {
                doc.settings = Some(SettingsBlock::from_attributes(attributes));
            }
            continue;
        }

        let ordinal = doc.pages.len() + 1;
        let id = explicit_id(&attributes)
            .or_else(|| segment.tag.map(str::to_owned))
            .unwrap_or_else(|| format!("page-{ordinal}"));
        doc.pages.push(Page {
            id,
            frontmatter: attributes,
            body: body.to_owned(),
            ordinal,
        });
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for page in &doc.pages {
        if !seen.insert(page.id.as_str()) && reported.insert(page.id.as_str()) {
            tracing::warn!(id = %page.id, "Duplicate page id");
            doc.warnings.push(ParseWarning::DuplicateId {
                id: page.id.clone(),
            });
        }
    }

    doc
}

/// Non-empty segment between delimiters.
#[derive(Debug, PartialEq, Eq)]
struct Segment<'a> {
    /// Id tag from the preceding delimiter.
    tag: Option<&'a str>,
    /// Trimmed segment text.
    text: &'a str,
}

/// Split on delimiter lines. Returns `None` when the input has none.
fn split_segments(raw: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut found = false;
    let mut start = 0;
    let mut offset = 0;
    let mut tag = None;

    for line in raw.split_inclusive('\n') {
        if let Some(next_tag) = parse_delimiter(line) {
            found = true;
            push_segment(&mut segments, tag, &raw[start..offset]);
            tag = next_tag;
            start = offset + line.len();
        }
        offset += line.len();
    }

    if !found {
        return None;
    }
    push_segment(&mut segments, tag, &raw[start..]);
    Some(segments)
}

fn push_segment<'a>(segments: &mut Vec<Segment<'a>>, tag: Option<&'a str>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        segments.push(Segment { tag, text });
    }
}

/// Parse a delimiter line.
///
/// Returns `Some(tag)` for `====`, `==[intro]==`, `====[intro]====` (at least
/// four `=` in total), `None` for any other line.
fn parse_delimiter(line: &str) -> Option<Option<&str>> {
    let line = line.trim();
    let leading = line.len() - line.trim_start_matches('=').len();
    if leading == 0 {
        return None;
    }

    let rest = &line[leading..];
    let (tag, trailing) = match rest.strip_prefix('[') {
        Some(inner) => {
            let end = inner.find(']')?;
            (Some(inner[..end].trim()), &inner[end + 1..])
        }
        None => (None, rest),
    };

    if !trailing.bytes().all(|b| b == b'=') || leading + trailing.len() < 4 {
        return None;
    }

    Some(tag.filter(|t| !t.is_empty()))
}

fn split_frontmatter<'a>(
    segment: &'a str,
    number: usize,
    warnings: &mut Vec<ParseWarning>,
) -> (Attributes, &'a str) {
    match frontmatter::split(segment) {
        Ok(fm) => (fm.attributes, fm.body),
        Err(source) => {
            tracing::warn!(segment = number, error = %source, "Malformed front matter");
            warnings.push(ParseWarning::Frontmatter {
                segment: number,
                source,
            });
            (Attributes::new(), segment)
        }
    }
}

fn explicit_id(attributes: &Attributes) -> Option<String> {
    match attributes.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn take_string(attributes: &mut Attributes, key: &str) -> Option<String> {
    match attributes.remove(key)? {
        Value::String(s) => Some(s),
        other => {
            attributes.insert(key.to_owned(), other);
            None
        }
    }
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("===="), Some(None));
        assert_eq!(parse_delimiter("  ========  \n"), Some(None));
        assert_eq!(parse_delimiter("==[intro]=="), Some(Some("intro")));
        assert_eq!(parse_delimiter("====[intro]===="), Some(Some("intro")));
        assert_eq!(parse_delimiter("==[]=="), Some(None));
        assert_eq!(parse_delimiter("==="), None);
        assert_eq!(parse_delimiter("=[a]="), None);
        assert_eq!(parse_delimiter("==== title"), None);
        assert_eq!(parse_delimiter("[intro]===="), None);
        assert_eq!(parse_delimiter("==[intro"), None);
    }

    #[test]
    fn test_no_delimiters_single_page() {
        let doc = parse("\n  # Hello\n\nWorld  \n");

        assert!(doc.settings.is_none());
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].id, "page-1");
        assert_eq!(doc.pages[0].ordinal, 1);
        assert_eq!(doc.pages[0].body, "# Hello\n\nWorld");
    }

    #[test]
    fn test_no_delimiters_body_equals_trimmed_input() {
        for input in ["", "plain", "  a: b\nc  ", "title: Hi\n\n{{Avatar}}", "=== not a delimiter"] {
            let doc = parse(input);
            assert_eq!(doc.pages.len(), 1);
            assert_eq!(doc.pages[0].id, "page-1");
            assert_eq!(doc.pages[0].body, input.trim());
        }
    }

    #[test]
    fn test_no_delimiters_settings_type_is_a_page() {
        let doc = parse("---\ntype: settings\n---\nBody");

        assert!(doc.settings.is_none());
        assert_eq!(doc.pages[0].body, "Body");
    }

    #[test]
    fn test_duplicate_tags_last_wins() {
        let doc = parse("==[intro]==\ntitle: Hi\n==[intro]==\nBody {{Highlight text=\"x\"}}");

        assert!(doc.settings.is_none());
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].id, "intro");
        assert_eq!(doc.pages[0].body, "title: Hi");
        assert_eq!(doc.pages[1].id, "intro");
        assert_eq!(doc.pages[1].body, "Body {{Highlight text=\"x\"}}");

        let page = doc.page("intro").unwrap();
        assert_eq!(page.ordinal, 2);
        assert_eq!(doc.warnings.len(), 1);
        assert!(matches!(&doc.warnings[0], ParseWarning::DuplicateId { id } if id == "intro"));
    }

    #[test]
    fn test_settings_and_pages() {
        let raw = "\
---
type: settings
defaultTemplate: portfolio
defaultLayout: wide
sharedData:
  name: Ada
components: [Avatar, Button]
theme: dark
---
====
---
title: Home
---
# Welcome
====[projects]====
# Projects
";
        let doc = parse(raw);

        let settings = doc.settings.unwrap();
        assert_eq!(settings.default_template.as_deref(), Some("portfolio"));
        assert_eq!(settings.default_layout.as_deref(), Some("wide"));
        assert_eq!(settings.shared_data.get("name"), Some(&json!("Ada")));
        assert_eq!(settings.components, vec!["Avatar", "Button"]);
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));
        assert_eq!(settings.extra.get("type"), Some(&json!("settings")));

        let ids: Vec<&str> = doc.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["page-1", "projects"]);
        assert_eq!(doc.pages[0].title(), Some("Home"));
        assert_eq!(doc.pages[0].body, "# Welcome");
        assert_eq!(doc.pages[1].ordinal, 2);
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_first_settings_block_wins() {
        let raw = "---\ntype: settings\ndefaultTemplate: a\n---\n====\n---\ntype: settings\ndefaultTemplate: b\n---\n====\nPage";
        let doc = parse(raw);

        assert_eq!(
            doc.settings.unwrap().default_template.as_deref(),
            Some("a")
        );
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].id, "page-1");
        assert!(matches!(doc.warnings[0], ParseWarning::ExtraSettings { segment: 2 }));
    }

    #[test]
    fn test_explicit_id_beats_tag() {
        let doc = parse("====[tagged]====\n---\nid: explicit\n---\nBody");

        assert_eq!(doc.pages[0].id, "explicit");
    }

    #[test]
    fn test_empty_segments_dropped() {
        let doc = parse("====\n\n====\nA\n====\n   \n====\nB\n====");

        let bodies: Vec<&str> = doc.pages.iter().map(|p| p.body.as_str()).collect();
        assert_eq!(bodies, vec!["A", "B"]);
        assert_eq!(doc.pages[1].id, "page-2");
    }

    #[test]
    fn test_malformed_frontmatter_recovered() {
        let doc = parse("====\n---\ntitle: [oops\n---\nBody\n====\nNext");

        assert_eq!(doc.pages.len(), 2);
        assert!(doc.pages[0].frontmatter.is_empty());
        assert_eq!(doc.pages[0].body, "---\ntitle: [oops\n---\nBody");
        assert!(matches!(
            doc.warnings[0],
            ParseWarning::Frontmatter { segment: 1, .. }
        ));
        assert_eq!(doc.pages[1].body, "Next");
    }

    #[test]
    fn test_select() {
        let doc = parse("====[a]====\nA\n====[b]====\nB");

        assert_eq!(doc.select(Some("b")).unwrap().body, "B");
        assert_eq!(doc.select(Some("missing")).unwrap().body, "A");
        assert_eq!(doc.select(None).unwrap().body, "A");
    }

    #[test]
    fn test_only_delimiters_has_no_pages() {
        let doc = parse("====\n\n====");

        assert!(doc.pages.is_empty());
        assert!(doc.select(None).is_none());
    }
}
