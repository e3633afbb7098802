//! Page templates.
//!
//! A template turns a [`PageView`] into a complete HTML document. Templates
//! are looked up by name in a [`TemplateRegistry`]; unknown names fall back
//! to `default`.

use std::collections::HashMap;
use std::fmt::Write;

use folio_components::PageLink;
use folio_markdown::escape_html;
use serde_json::Value;

use crate::composer::{DEFAULT_TEMPLATE, RenderPlan};
use crate::error::SiteError;
use crate::navigation::Navigation;

/// Sections the portfolio template places explicitly, in this order.
const PORTFOLIO_SLOTS: [&str; 3] = ["hero-left", "hero-right", "main"];

/// Everything a template receives.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Composed page.
    pub plan: RenderPlan,
    /// Virtual path of the document.
    pub path: String,
    /// Id of the rendered page.
    pub current_page_id: String,
    /// All pages of the document.
    pub pages: Vec<PageLink>,
    /// Number of pages in the document.
    pub total_pages: usize,
    /// Navigation of the section the document belongs to.
    pub navigation: Navigation,
}

impl PageView {
    /// Whether page tabs should be shown.
    ///
    /// Multi-page documents show them unless the page sets
    /// `showNavigation: false`.
    #[must_use]
    pub fn show_page_navigation(&self) -> bool {
        let disabled = self.plan.extra.get("showNavigation") == Some(&Value::Bool(false));
        !disabled && self.pages.len() > 1
    }
}

/// Renders a [`PageView`] to a complete HTML document.
pub trait Template: Send + Sync {
    /// Render the page.
    fn render(&self, view: &PageView) -> String;
}

/// Name to [`Template`] mapping.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Box<dyn Template>>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `default`, `article`, `section-index` and
    /// `portfolio`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_TEMPLATE, DefaultTemplate);
        registry.register("article", ArticleTemplate);
        registry.register("section-index", SectionIndexTemplate);
        registry.register("portfolio", PortfolioTemplate);
        registry
    }

    /// Add a template, replacing any template with the same name.
    pub fn register(&mut self, name: impl Into<String>, template: impl Template + 'static) {
        self.templates.insert(name.into(), Box::new(template));
    }

    /// Look up a template by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Template> {
        self.templates.get(name).map(Box::as_ref)
    }

    /// Look up a template, falling back to `default`.
    pub fn resolve(&self, name: &str) -> Result<&dyn Template, SiteError> {
        if let Some(template) = self.get(name) {
            return Ok(template);
        }
        tracing::warn!(template = name, "Template not found, using default");
        self.get(DEFAULT_TEMPLATE)
            .ok_or_else(|| SiteError::NoTemplate(name.to_owned()))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.names())
            .finish()
    }
}

/// Opening of an HTML document up to and including `<body>`.
fn open_document(html: &mut String, title: &str, class: &str, layout: Option<&str>) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(title));
    html.push_str("</head>\n");
    match layout {
        Some(layout) => {
            let _ = writeln!(
                html,
                "<body class=\"{class}\" data-layout=\"{}\">",
                escape_html(layout)
            );
        }
        None => {
            let _ = writeln!(html, "<body class=\"{class}\">");
        }
    }
}

fn close_document(html: &mut String) {
    html.push_str("</body>\n</html>\n");
}

fn push_section(html: &mut String, plan: &RenderPlan, name: &str) {
    if let Some(content) = plan.section_html(name) {
        let _ = writeln!(
            html,
            "<section class=\"section-{}\">{content}</section>",
            escape_html(name)
        );
    }
}

fn push_page_tabs(html: &mut String, view: &PageView) {
    html.push_str("<nav class=\"page-navigation\">");
    for page in &view.pages {
        let active = if page.id == view.current_page_id {
            " active"
        } else {
            ""
        };
        let _ = write!(
            html,
            "<a class=\"page-tab{active}\" href=\"?page={}\">{}</a>",
            escape_html(&page.id),
            escape_html(&page.title)
        );
    }
    html.push_str("</nav>\n");
}

/// Plain layout: every section, then the main content.
struct DefaultTemplate;

impl Template for DefaultTemplate {
    fn render(&self, view: &PageView) -> String {
        let plan = &view.plan;
        let mut html = String::with_capacity(4096);
        open_document(&mut html, &plan.title, "default-template", plan.layout.as_deref());

        let _ = writeln!(html, "<header><h1>{}</h1></header>", escape_html(&plan.title));
        html.push_str("<main>\n");
        for name in plan.sections.keys() {
            push_section(&mut html, plan, name);
        }
        html.push_str(&plan.main_html());
        html.push_str("</main>\n");

        close_document(&mut html);
        html
    }
}

/// Documentation layout with section navigation and breadcrumbs.
struct ArticleTemplate;

impl Template for ArticleTemplate {
    fn render(&self, view: &PageView) -> String {
        let plan = &view.plan;
        let mut html = String::with_capacity(8192);
        open_document(&mut html, &plan.title, "article-template", plan.layout.as_deref());

        html.push_str("<div class=\"article-layout\">\n<aside class=\"article-sidebar\">\n");
        html.push_str("<h2>Contents</h2>\n<ul>\n");
        for item in &view.navigation.items {
            let _ = writeln!(
                html,
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&item.path),
                escape_html(&item.title)
            );
        }
        html.push_str("</ul>\n</aside>\n<article class=\"article-content\">\n");

        let crumb = if view.current_page_id.is_empty() {
            "Article"
        } else {
            view.current_page_id.as_str()
        };
        let _ = writeln!(
            html,
            "<nav class=\"breadcrumbs\"><a href=\"/\">Home</a> › <span>{}</span></nav>",
            escape_html(crumb)
        );
        let _ = writeln!(html, "<h1>{}</h1>", escape_html(&plan.title));
        html.push_str("<div class=\"markdown-body\">\n");
        for name in plan.sections.keys() {
            push_section(&mut html, plan, name);
        }
        html.push_str(&plan.main_html());
        html.push_str("</div>\n</article>\n</div>\n");

        close_document(&mut html);
        html
    }
}

/// Landing page for a section.
struct SectionIndexTemplate;

impl Template for SectionIndexTemplate {
    fn render(&self, view: &PageView) -> String {
        let plan = &view.plan;
        let mut html = String::with_capacity(4096);
        open_document(&mut html, &plan.title, "section-index-template", plan.layout.as_deref());

        let heading = if plan.title.is_empty() {
            "Section Index"
        } else {
            plan.title.as_str()
        };
        let _ = writeln!(
            html,
            "<header class=\"section-index-header\"><h1>{}</h1><p>Explore our content</p></header>",
            escape_html(heading)
        );
        html.push_str("<div class=\"section-content\">\n");
        html.push_str(&plan.main_html());
        html.push_str("</div>\n");

        close_document(&mut html);
        html
    }
}

/// Personal portfolio: hero sections, page tabs, remaining sections.
struct PortfolioTemplate;

impl Template for PortfolioTemplate {
    fn render(&self, view: &PageView) -> String {
        let plan = &view.plan;
        let mut html = String::with_capacity(8192);
        open_document(&mut html, &plan.title, "portfolio-template", plan.layout.as_deref());

        let _ = writeln!(html, "<header><h1>{}</h1></header>", escape_html(&plan.title));
        if view.show_page_navigation() {
            push_page_tabs(&mut html, view);
        }

        html.push_str("<div class=\"content-wrapper\">\n");
        for name in PORTFOLIO_SLOTS {
            push_section(&mut html, plan, name);
        }
        for name in plan.sections.keys() {
            if !PORTFOLIO_SLOTS.contains(&name.as_str()) {
                push_section(&mut html, plan, name);
            }
        }
        html.push_str(&plan.main_html());
        html.push_str("</div>\n");

        close_document(&mut html);
        html
    }
}

/// Render the page shown when a document cannot be loaded.
#[must_use]
pub fn render_error_page(path: &str, branch: &str, error: &SiteError) -> String {
    let mut html = String::with_capacity(1024);
    open_document(&mut html, "404 - Content Not Found", "error-page", None);

    html.push_str("<div class=\"error-view\">\n");
    html.push_str("<h1>404 - Content Not Found</h1>\n");
    html.push_str("<p>Unable to fetch the content for this page.</p>\n");
    let _ = writeln!(
        html,
        "<p class=\"error-message\">Error: {}</p>",
        escape_html(&error.to_string())
    );
    let _ = writeln!(
        html,
        "<p><strong>Note:</strong> Content is fetched from the repository, so the file \
         <code>{}</code> must exist in the <code>{}</code> branch. \
         Local files must be pushed before they are visible.</p>",
        escape_html(path),
        escape_html(branch)
    );
    html.push_str("</div>\n");

    close_document(&mut html);
    html
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use folio_storage::StorageError;
    use serde_json::json;

    use super::*;
    use crate::composer::RenderedPart;
    use crate::navigation::{NavItem, NavigationKind};

    static_assertions::assert_impl_all!(TemplateRegistry: Send, Sync);

    fn view() -> PageView {
        let mut sections = BTreeMap::new();
        sections.insert(
            "hero-left".to_owned(),
            vec![RenderedPart::Html("<p>left</p>".to_owned())],
        );
        sections.insert(
            "about".to_owned(),
            vec![RenderedPart::Html("<p>about</p>".to_owned())],
        );
        PageView {
            plan: RenderPlan {
                template: "portfolio".to_owned(),
                title: "Ada <Lovelace>".to_owned(),
                sections,
                main: vec![RenderedPart::Html("<p>main</p>".to_owned())],
                ..RenderPlan::default()
            },
            path: "README.md".to_owned(),
            current_page_id: "work".to_owned(),
            pages: vec![
                PageLink {
                    id: "home".to_owned(),
                    title: "Home".to_owned(),
                },
                PageLink {
                    id: "work".to_owned(),
                    title: "Work".to_owned(),
                },
            ],
            total_pages: 2,
            navigation: Navigation {
                kind: NavigationKind::Sidebar,
                items: vec![NavItem {
                    title: "Guide".to_owned(),
                    path: "guide.md".to_owned(),
                }],
            },
        }
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            TemplateRegistry::with_builtins().names(),
            vec!["article", "default", "portfolio", "section-index"]
        );
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let registry = TemplateRegistry::with_builtins();

        let html = registry.resolve("missing").unwrap().render(&view());

        assert!(html.contains("class=\"default-template\""));
    }

    #[test]
    fn test_resolve_without_default_fails() {
        let registry = TemplateRegistry::new();

        let result = registry.resolve("portfolio");

        assert!(matches!(result, Err(SiteError::NoTemplate(name)) if name == "portfolio"));
    }

    #[test]
    fn test_portfolio_orders_sections() {
        let html = TemplateRegistry::with_builtins()
            .resolve("portfolio")
            .unwrap()
            .render(&view());

        let left = html.find("section-hero-left").unwrap();
        let about = html.find("section-about").unwrap();
        let main = html.find("<p>main</p>").unwrap();
        assert!(left < about && about < main);
        assert!(html.contains("<title>Ada &lt;Lovelace&gt;</title>"));
        assert!(html.contains("<a class=\"page-tab active\" href=\"?page=work\">Work</a>"));
    }

    #[test]
    fn test_portfolio_navigation_can_be_disabled() {
        let mut view = view();
        view.plan
            .extra
            .insert("showNavigation".to_owned(), json!(false));

        assert!(!view.show_page_navigation());
        let html = TemplateRegistry::with_builtins()
            .resolve("portfolio")
            .unwrap()
            .render(&view);
        assert!(!html.contains("page-navigation"));
    }

    #[test]
    fn test_article_lists_navigation() {
        let html = TemplateRegistry::with_builtins()
            .resolve("article")
            .unwrap()
            .render(&view());

        assert!(html.contains("<li><a href=\"guide.md\">Guide</a></li>"));
        assert!(html.contains("<span>work</span>"));
    }

    #[test]
    fn test_error_page() {
        let error = SiteError::from(StorageError::not_found("docs/missing.md"));

        let html = render_error_page("missing.md", "main", &error);

        assert!(html.contains("<h1>404 - Content Not Found</h1>"));
        assert!(html.contains("Unable to fetch the content for this page."));
        assert!(html.contains("<code>missing.md</code>"));
        assert!(html.contains("<code>main</code> branch"));
    }
}
