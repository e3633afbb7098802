//! Per-page configuration.
//!
//! Merges the document's settings block with one page's front matter.

use folio_markdown::{Attributes, Page, SettingsBlock};
use serde::Serialize;
use serde_json::{Map, Value};

/// Front matter keys consumed by [`PageConfig`]; everything else lands in
/// [`PageConfig::extra`].
const KNOWN_KEYS: [&str; 5] = ["template", "layout", "components", "data", "title"];

/// Settings defaults merged with one page's front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Template named by the page itself.
    pub template: Option<String>,
    /// Template named by the settings block.
    pub default_template: Option<String>,
    /// Page layout, falling back to the settings default.
    pub layout: Option<String>,
    /// Page title.
    pub title: Option<String>,
    /// Settings components followed by page components.
    pub components: Vec<String>,
    /// Shared data deep-merged with page data (page wins).
    pub data: Map<String, Value>,
    /// Remaining front matter keys.
    pub extra: Attributes,
}

impl PageConfig {
    /// Merge settings defaults with a page's front matter.
    #[must_use]
    pub fn merge(settings: Option<&SettingsBlock>, page: &Page) -> Self {
        let frontmatter = &page.frontmatter;
        let string = |key: &str| {
            frontmatter
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let mut components: Vec<String> = settings
            .map(|s| s.components.clone())
            .unwrap_or_default();
        if let Some(Value::Array(items)) = frontmatter.get("components") {
            components.extend(items.iter().filter_map(Value::as_str).map(str::to_owned));
        }

        let mut data = settings.map(|s| s.shared_data.clone()).unwrap_or_default();
        if let Some(Value::Object(page_data)) = frontmatter.get("data") {
            deep_merge(&mut data, page_data);
        }

        let extra = frontmatter
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            template: string("template"),
            default_template: settings.and_then(|s| s.default_template.clone()),
            layout: string("layout").or_else(|| settings.and_then(|s| s.default_layout.clone())),
            title: string("title"),
            components,
            data,
            extra,
        }
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Nested objects merge key by key; any other value in `overlay` replaces
/// the one in `base`.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn page(frontmatter: Value) -> Page {
        Page {
            id: "page-1".to_owned(),
            frontmatter: object(frontmatter),
            body: String::new(),
            ordinal: 1,
        }
    }

    #[test]
    fn test_deep_merge() {
        let mut base = object(json!({
            "name": "Ada",
            "social": {"github": "ada", "x": "ada_x"},
            "tags": ["a"]
        }));

        deep_merge(
            &mut base,
            &object(json!({"social": {"x": "ada_new"}, "tags": ["b"], "years": 3})),
        );

        assert_eq!(
            Value::Object(base),
            json!({
                "name": "Ada",
                "social": {"github": "ada", "x": "ada_new"},
                "tags": ["b"],
                "years": 3
            })
        );
    }

    #[test]
    fn test_merge_settings_and_page() {
        let settings = SettingsBlock {
            default_template: Some("portfolio".to_owned()),
            default_layout: Some("wide".to_owned()),
            shared_data: object(json!({"name": "Ada", "theme": {"color": "blue"}})),
            components: vec!["Typewriter".to_owned()],
            extra: Map::new(),
        };
        let page = page(json!({
            "title": "About",
            "components": ["Avatar"],
            "data": {"theme": {"accent": "red"}},
            "showNavigation": false
        }));

        let config = PageConfig::merge(Some(&settings), &page);

        assert_eq!(config.template, None);
        assert_eq!(config.default_template.as_deref(), Some("portfolio"));
        assert_eq!(config.layout.as_deref(), Some("wide"));
        assert_eq!(config.title.as_deref(), Some("About"));
        assert_eq!(config.components, vec!["Typewriter", "Avatar"]);
        assert_eq!(
            Value::Object(config.data),
            json!({"name": "Ada", "theme": {"color": "blue", "accent": "red"}})
        );
        assert_eq!(Value::Object(config.extra), json!({"showNavigation": false}));
    }

    #[test]
    fn test_page_overrides_settings() {
        let settings = SettingsBlock {
            default_layout: Some("wide".to_owned()),
            shared_data: object(json!({"name": "Ada"})),
            ..SettingsBlock::default()
        };
        let page = page(json!({
            "template": "article",
            "layout": "narrow",
            "data": {"name": "Grace"}
        }));

        let config = PageConfig::merge(Some(&settings), &page);

        assert_eq!(config.template.as_deref(), Some("article"));
        assert_eq!(config.layout.as_deref(), Some("narrow"));
        assert_eq!(config.data.get("name"), Some(&json!("Grace")));
    }

    #[test]
    fn test_merge_without_settings() {
        let config = PageConfig::merge(None, &page(json!({"data": {"a": 1}})));

        assert_eq!(config.default_template, None);
        assert_eq!(config.layout, None);
        assert!(config.components.is_empty());
        assert_eq!(Value::Object(config.data), json!({"a": 1}));
    }
}
