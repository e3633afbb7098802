//! Built-in components.
//!
//! Each component renders a self-contained HTML fragment. Theme colors are
//! referenced through the `--ui-color` CSS custom property so the page theme
//! stays in charge of them. URL props go through [`is_safe_url`]; rejected
//! values are dropped.

use std::fmt::Write;
use std::sync::Arc;

use folio_markdown::{UrlKind, escape_html, is_safe_url};
use serde_json::Value;

use crate::component::{Component, PageLink, RenderContext};
use crate::registry::ComponentDefinition;
use crate::schema::{PropSchema, PropSpec, PropType};

const UI_COLOR: &str = "var(--ui-color)";

/// Definitions of all built-in components.
pub(crate) fn definitions() -> Vec<ComponentDefinition> {
    vec![
        ComponentDefinition::new(
            "Typewriter",
            "Animated typing effect component",
            PropSchema::new()
                .prop(
                    "items",
                    PropSpec::new(PropType::Array, "Array of strings to type").required(),
                )
                .prop(
                    "loop",
                    PropSpec::new(PropType::Boolean, "Loop the animation").with_default(false),
                )
                .prop(
                    "prefix",
                    PropSpec::new(PropType::String, "Text before typed content").with_default(""),
                ),
            || Arc::new(Typewriter),
        ),
        ComponentDefinition::new(
            "Avatar",
            "Profile avatar image component",
            PropSchema::new()
                .prop(
                    "src",
                    PropSpec::new(PropType::String, "Image source URL").required(),
                )
                .prop(
                    "size",
                    PropSpec::new(PropType::String, "Size: small, medium, large")
                        .with_default("medium"),
                )
                .prop(
                    "animated",
                    PropSpec::new(PropType::Boolean, "Enable animation").with_default(false),
                )
                .prop(
                    "border",
                    PropSpec::new(PropType::String, "Border color").with_default("none"),
                ),
            || Arc::new(Avatar),
        ),
        ComponentDefinition::new(
            "SocialLinks",
            "Social media links component",
            PropSchema::new()
                .prop(
                    "className",
                    PropSpec::new(PropType::String, "CSS class name").with_default(""),
                )
                .prop(
                    "size",
                    PropSpec::new(PropType::String, "Icon size").with_default("medium"),
                ),
            || Arc::new(SocialLinks),
        ),
        ComponentDefinition::new(
            "Button",
            "Call-to-action button component",
            PropSchema::new()
                .prop("href", PropSpec::new(PropType::String, "Link URL"))
                .prop(
                    "variant",
                    PropSpec::new(PropType::String, "Button style variant")
                        .with_default("primary"),
                )
                .prop(
                    "target",
                    PropSpec::new(PropType::String, "Link target").with_default("_self"),
                ),
            || Arc::new(Button),
        ),
        ComponentDefinition::new(
            "Highlight",
            "Highlighted text span component",
            PropSchema::new()
                .prop(
                    "text",
                    PropSpec::new(PropType::String, "Text to highlight").required(),
                )
                .prop(
                    "color",
                    PropSpec::new(PropType::String, "Highlight color").with_default("primary"),
                ),
            || Arc::new(Highlight),
        ),
        ComponentDefinition::new(
            "PageNavigation",
            "Multi-page navigation tabs component",
            PropSchema::new()
                .prop(
                    "pages",
                    PropSpec::new(PropType::Array, "Array of page objects"),
                )
                .prop(
                    "currentPageId",
                    PropSpec::new(PropType::String, "Current page ID"),
                ),
            || Arc::new(PageNavigation),
        ),
    ]
}

/// URL prop, `None` when absent or rejected.
fn url_prop<'a>(ctx: &RenderContext<'a>, name: &str, kind: UrlKind) -> Option<&'a str> {
    let url = ctx.str_prop(name)?;
    if is_safe_url(url, kind) {
        Some(url)
    } else {
        tracing::warn!(prop = name, url, "Dropping unsafe URL prop");
        None
    }
}

/// Text for a JSON scalar (strings unquoted).
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Typing animation over `items`. The first item is rendered as static text
/// so the fragment is readable without scripts.
struct Typewriter;

impl Component for Typewriter {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let items: Vec<String> = ctx
            .array_prop("items")
            .unwrap_or_default()
            .iter()
            .filter_map(display_value)
            .collect();
        let items_json = serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_owned());

        let mut html = format!(
            r#"<span class="typewriter-wrapper" data-items="{}" data-loop="{}">"#,
            escape_html(&items_json),
            ctx.bool_prop("loop")
        );
        if let Some(prefix) = ctx.str_prop("prefix").filter(|p| !p.is_empty()) {
            let _ = write!(html, "<span>{}</span>", escape_html(prefix));
        }
        let _ = write!(
            html,
            r#"<span class="typewriter-text" style="color: {UI_COLOR}">{}</span></span>"#,
            escape_html(items.first().map_or("", String::as_str))
        );
        html
    }
}

struct Avatar;

impl Avatar {
    fn size(size: &str) -> &str {
        match size {
            "small" => "100px",
            "medium" => "200px",
            "large" => "300px",
            other => other,
        }
    }
}

impl Component for Avatar {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let size = Self::size(ctx.str_prop("size").unwrap_or("medium"));
        let border = match ctx.str_prop("border").unwrap_or("none") {
            "none" => "none".to_owned(),
            "primary" => format!("4px solid {UI_COLOR}"),
            color => format!("4px solid {color}"),
        };
        let animation = if ctx.bool_prop("animated") {
            "float 3s ease-in-out infinite"
        } else {
            "none"
        };
        let style = format!(
            "width: {size}; height: {size}; border-radius: 50%; object-fit: cover; \
             border: {border}; animation: {animation}"
        );

        format!(
            r#"<img src="{}" alt="Avatar" class="avatar-component" style="{}">"#,
            escape_html(url_prop(ctx, "src", UrlKind::Image).unwrap_or_default()),
            escape_html(&style)
        )
    }
}

/// Links from the page data's `social` entry: either a list of
/// `{ name, url }` objects or a `name: url` mapping.
struct SocialLinks;

impl SocialLinks {
    fn links(data: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
        match data.get("social") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| {
                    let name = item.get("name")?.as_str()?;
                    let url = item.get("url")?.as_str()?;
                    Some((name.to_owned(), url.to_owned()))
                })
                .collect(),
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(name, url)| Some((name.clone(), url.as_str()?.to_owned())))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Component for SocialLinks {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let size = ctx.str_prop("size").unwrap_or("medium");
        let mut class = format!("social-links social-links-{size}");
        if let Some(extra) = ctx.str_prop("className").filter(|c| !c.is_empty()) {
            class.push(' ');
            class.push_str(extra);
        }

        let mut html = format!(r#"<div class="{}">"#, escape_html(&class));
        for (name, url) in Self::links(ctx.data) {
            if !is_safe_url(&url, UrlKind::Link) {
                tracing::warn!(link = %name, "Dropping social link with unsafe URL");
                continue;
            }
            let slug = name.to_lowercase().replace(char::is_whitespace, "-");
            let _ = write!(
                html,
                r#"<a class="social-link social-{}" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                escape_html(&slug),
                escape_html(&url),
                escape_html(&name)
            );
        }
        html.push_str("</div>");
        html
    }
}

/// Link styled as a button; a plain `<button>` when there is no `href`.
/// The label is the block children.
struct Button;

impl Component for Button {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let variant = ctx.str_prop("variant").unwrap_or("primary");
        let class = escape_html(&format!("btn btn-{variant}"));
        let label = escape_html(ctx.children_text().unwrap_or_default());

        match url_prop(ctx, "href", UrlKind::Link) {
            Some(href) => {
                let target = ctx.str_prop("target").unwrap_or("_self");
                let rel = if target == "_blank" {
                    r#" rel="noopener noreferrer""#
                } else {
                    ""
                };
                format!(
                    r#"<a class="{class}" href="{}" target="{}"{rel}>{label}</a>"#,
                    escape_html(href),
                    escape_html(target)
                )
            }
            None => format!(r#"<button type="button" class="{class}">{label}</button>"#),
        }
    }
}

/// Emphasized span. Falls back to the block children when `text` is absent.
struct Highlight;

impl Highlight {
    fn color(name: &str) -> &str {
        match name {
            "primary" => UI_COLOR,
            "secondary" => "#6c757d",
            "success" => "#28a745",
            "danger" => "#dc3545",
            "warning" => "#ffc107",
            "info" => "#17a2b8",
            other => other,
        }
    }
}

impl Component for Highlight {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let text = ctx
            .str_prop("text")
            .or_else(|| ctx.children_text())
            .unwrap_or_default();
        let color = Self::color(ctx.str_prop("color").unwrap_or("primary"));

        format!(
            r#"<span class="highlight" style="color: {}; font-weight: bold">{}</span>"#,
            escape_html(color),
            escape_html(text)
        )
    }
}

/// Tabs linking to the document's pages. Renders nothing for a single page.
struct PageNavigation;

impl PageNavigation {
    fn pages_from_prop(items: &[Value]) -> Vec<PageLink> {
        items
            .iter()
            .filter_map(|item| {
                let id = item.get("id")?.as_str()?.to_owned();
                let title = item
                    .get("title")
                    .or_else(|| item.get("frontmatter").and_then(|fm| fm.get("title")))
                    .and_then(Value::as_str)
                    .unwrap_or(&id)
                    .to_owned();
                Some(PageLink { id, title })
            })
            .collect()
    }
}

impl Component for PageNavigation {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let from_prop;
        let pages: &[PageLink] = match ctx.array_prop("pages") {
            Some(items) => {
                from_prop = Self::pages_from_prop(items);
                &from_prop
            }
            None => ctx.pages,
        };
        if pages.len() <= 1 {
            return String::new();
        }
        let current = ctx.str_prop("currentPageId").or(ctx.current_page_id);

        let mut html = String::from(r#"<nav class="page-navigation"><div class="page-tabs">"#);
        for page in pages {
            let active = if current == Some(page.id.as_str()) {
                " active"
            } else {
                ""
            };
            let _ = write!(
                html,
                r#"<a class="page-tab{active}" href="?page={}">{}</a>"#,
                escape_html(&page.id),
                escape_html(&page.title)
            );
        }
        html.push_str("</div></nav>");
        html
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    use super::*;

    fn render(component: &dyn Component, props: Value, children: Option<&str>) -> String {
        render_with(component, props, children, &json!({}), &[], None)
    }

    fn render_with(
        component: &dyn Component,
        props: Value,
        children: Option<&str>,
        data: &Value,
        pages: &[PageLink],
        current: Option<&str>,
    ) -> String {
        let props: Map<String, Value> = props.as_object().cloned().unwrap_or_default();
        let data: Map<String, Value> = data.as_object().cloned().unwrap_or_default();
        component.render(&RenderContext {
            props: &props,
            children,
            data: &data,
            pages,
            current_page_id: current,
        })
    }

    #[test]
    fn test_definitions_names() {
        let names: Vec<String> = definitions().iter().map(|d| d.name().to_owned()).collect();

        assert_eq!(
            names,
            vec![
                "Typewriter",
                "Avatar",
                "SocialLinks",
                "Button",
                "Highlight",
                "PageNavigation"
            ]
        );
    }

    #[test]
    fn test_typewriter() {
        let html = render(
            &Typewriter,
            json!({"items": ["Engineer", "Writer"], "loop": true, "prefix": "I'm an "}),
            None,
        );

        assert_eq!(
            html,
            "<span class=\"typewriter-wrapper\" data-items=\"[&quot;Engineer&quot;,&quot;Writer&quot;]\" \
             data-loop=\"true\"><span>I&#x27;m an </span><span class=\"typewriter-text\" \
             style=\"color: var(--ui-color)\">Engineer</span></span>"
        );
    }

    #[test]
    fn test_avatar_sizes_and_border() {
        let html = render(
            &Avatar,
            json!({"src": "me.png", "size": "large", "border": "primary", "animated": true}),
            None,
        );

        assert!(html.starts_with("<img src=\"me.png\" alt=\"Avatar\""));
        assert!(html.contains("width: 300px; height: 300px"));
        assert!(html.contains("border: 4px solid var(--ui-color)"));
        assert!(html.contains("animation: float 3s ease-in-out infinite"));
    }

    #[test]
    fn test_avatar_escapes_src() {
        let html = render(&Avatar, json!({"src": "\"><script>"}), None);

        assert!(!html.contains("<script>"));
        assert!(html.contains("width: 200px"));
    }

    #[test]
    fn test_social_links_from_list_and_map() {
        let data = json!({"social": [{"name": "GitHub", "url": "https://github.com/ada"}]});
        let html = render_with(&SocialLinks, json!({"size": "small"}), None, &data, &[], None);

        assert_eq!(
            html,
            "<div class=\"social-links social-links-small\"><a class=\"social-link social-github\" \
             href=\"https://github.com/ada\" target=\"_blank\" rel=\"noopener noreferrer\">GitHub</a></div>"
        );

        let data = json!({"social": {"Mastodon": "https://m.social/@ada"}});
        let html = render_with(&SocialLinks, json!({}), None, &data, &[], None);
        assert!(html.contains("social-mastodon"));
    }

    #[test]
    fn test_button_link_and_plain() {
        let html = render(
            &Button,
            json!({"href": "/cv.pdf", "variant": "outline", "target": "_blank"}),
            Some(" Download CV "),
        );
        assert_eq!(
            html,
            "<a class=\"btn btn-outline\" href=\"/cv.pdf\" target=\"_blank\" \
             rel=\"noopener noreferrer\">Download CV</a>"
        );

        let html = render(&Button, json!({}), Some("Click"));
        assert_eq!(
            html,
            "<button type=\"button\" class=\"btn btn-primary\">Click</button>"
        );
    }

    #[test]
    fn test_script_urls_dropped() {
        let html = render(&Button, json!({"href": "javascript:alert(1)"}), Some("Go"));
        assert_eq!(
            html,
            "<button type=\"button\" class=\"btn btn-primary\">Go</button>"
        );

        let html = render(&Avatar, json!({"src": "javascript:alert(1)"}), None);
        assert!(html.starts_with("<img src=\"\" alt=\"Avatar\""));

        let data = json!({"social": [
            {"name": "Evil", "url": "javascript:alert(1)"},
            {"name": "GitHub", "url": "https://github.com/ada"}
        ]});
        let html = render_with(&SocialLinks, json!({}), None, &data, &[], None);
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("social-evil"));
        assert!(html.contains("social-github"));
    }

    #[test]
    fn test_avatar_accepts_data_image() {
        let html = render(&Avatar, json!({"src": "data:image/png;base64,AA"}), None);

        assert!(html.starts_with("<img src=\"data:image/png;base64,AA\""));
    }

    #[test]
    fn test_highlight_colors() {
        let html = render(&Highlight, json!({"text": "x", "color": "danger"}), None);
        assert_eq!(
            html,
            "<span class=\"highlight\" style=\"color: #dc3545; font-weight: bold\">x</span>"
        );

        let html = render(&Highlight, json!({}), Some("from children"));
        assert!(html.contains("var(--ui-color)"));
        assert!(html.contains(">from children<"));
    }

    #[test]
    fn test_page_navigation_from_context() {
        let pages = vec![
            PageLink {
                id: "home".to_owned(),
                title: "Home".to_owned(),
            },
            PageLink {
                id: "work".to_owned(),
                title: "Work".to_owned(),
            },
        ];
        let html = render_with(&PageNavigation, json!({}), None, &json!({}), &pages, Some("work"));

        assert_eq!(
            html,
            "<nav class=\"page-navigation\"><div class=\"page-tabs\">\
             <a class=\"page-tab\" href=\"?page=home\">Home</a>\
             <a class=\"page-tab active\" href=\"?page=work\">Work</a></div></nav>"
        );
    }

    #[test]
    fn test_page_navigation_from_prop() {
        let props = json!({
            "pages": [{"id": "a", "frontmatter": {"title": "Alpha"}}, {"id": "b"}],
            "currentPageId": "a"
        });
        let html = render(&PageNavigation, props, None);

        assert!(html.contains("page-tab active\" href=\"?page=a\">Alpha<"));
        assert!(html.contains("href=\"?page=b\">b<"));
    }

    #[test]
    fn test_page_navigation_single_page_is_empty() {
        let pages = vec![PageLink {
            id: "only".to_owned(),
            title: "Only".to_owned(),
        }];
        let html = render_with(&PageNavigation, json!({}), None, &json!({}), &pages, None);

        assert_eq!(html, "");
    }
}
