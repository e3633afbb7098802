//! Component trait and render context.

use serde::Serialize;
use serde_json::{Map, Value};

/// Reference to a page of the current document, for navigation components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// Page id, used in `?page=` links.
    pub id: String,
    /// Display title.
    pub title: String,
}

/// Everything a component sees when rendering one invocation.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Resolved properties, defaults applied.
    pub props: &'a Map<String, Value>,
    /// Raw text between open and close tags.
    pub children: Option<&'a str>,
    /// Merged page data.
    pub data: &'a Map<String, Value>,
    /// Pages of the current document.
    pub pages: &'a [PageLink],
    /// Id of the page being rendered.
    pub current_page_id: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    /// String property.
    #[must_use]
    pub fn str_prop(&self, name: &str) -> Option<&'a str> {
        self.props.get(name).and_then(Value::as_str)
    }

    /// Boolean property (`false` when absent or not a boolean).
    #[must_use]
    pub fn bool_prop(&self, name: &str) -> bool {
        self.props.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Array property.
    #[must_use]
    pub fn array_prop(&self, name: &str) -> Option<&'a [Value]> {
        self.props
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Children text, trimmed; `None` when absent or blank.
    #[must_use]
    pub fn children_text(&self) -> Option<&'a str> {
        self.children.map(str::trim).filter(|c| !c.is_empty())
    }
}

/// A renderable component.
///
/// Implementations produce an HTML fragment for one invocation. All
/// interpolated values must be HTML-escaped by the implementation.
///
/// # Example
///
/// ```
/// use folio_components::{Component, RenderContext};
///
/// struct Badge;
///
/// impl Component for Badge {
///     fn render(&self, ctx: &RenderContext<'_>) -> String {
///         let label = ctx.str_prop("label").unwrap_or("new");
///         format!("<span class=\"badge\">{}</span>", folio_markdown::escape_html(label))
///     }
/// }
/// ```
pub trait Component: Send + Sync {
    /// Render an invocation to HTML.
    fn render(&self, ctx: &RenderContext<'_>) -> String;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_prop_accessors() {
        let Value::Object(props) = json!({
            "src": "a.png",
            "loop": true,
            "items": ["a", "b"],
            "size": 3
        }) else {
            unreachable!()
        };
        let data = Map::new();
        let ctx = RenderContext {
            props: &props,
            children: Some("  \n "),
            data: &data,
            pages: &[],
            current_page_id: None,
        };

        assert_eq!(ctx.str_prop("src"), Some("a.png"));
        assert_eq!(ctx.str_prop("size"), None);
        assert!(ctx.bool_prop("loop"));
        assert!(!ctx.bool_prop("missing"));
        assert_eq!(ctx.array_prop("items").map(<[Value]>::len), Some(2));
        assert_eq!(ctx.children_text(), None);
    }
}
