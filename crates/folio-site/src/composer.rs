//! Page composition.
//!
//! Turns one parsed page into a [`RenderPlan`]: the page body is split into
//! sections, every section and the main content are expanded into parts,
//! text parts are interpolated and rendered to HTML, and component parts are
//! validated and rendered through the [`ComponentRegistry`].
//!
//! Component rendering runs on the rayon pool. Parts from all sections are
//! dispatched together and gathered back into document order.

use std::collections::BTreeMap;

use folio_components::{ComponentRegistry, PageLink, RenderContext};
use folio_config::SiteConfig;
use folio_markdown::{
    Attributes, ComponentInvocation, ContentPart, HtmlOptions, Page, PropValue, SettingsBlock,
    component, escape_html, interpolate, lookup, render_markdown, sections,
};
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::page_config::PageConfig;

/// Template used when nothing else names one.
pub const DEFAULT_TEMPLATE: &str = "default";

/// One rendered piece of a section or of the main content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedPart {
    /// Rendered markdown text.
    Html(String),
    /// Output of a component.
    Component {
        /// Component name.
        name: String,
        /// Rendered fragment.
        html: String,
    },
    /// Placeholder for a component that is not registered.
    Missing {
        /// Requested component name.
        name: String,
    },
}

impl RenderedPart {
    /// HTML of this part.
    #[must_use]
    pub fn html(&self) -> String {
        match self {
            Self::Html(html) | Self::Component { html, .. } => html.clone(),
            Self::Missing { name } => format!(
                "<span class=\"component-missing\">Component {} not found</span>",
                escape_html(name)
            ),
        }
    }
}

/// Everything a template needs to render one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    /// Template name, before registry fallback.
    pub template: String,
    /// Page layout hint.
    pub layout: Option<String>,
    /// Page title.
    pub title: String,
    /// Merged page data.
    pub data: Map<String, Value>,
    /// Named sections in name order.
    pub sections: BTreeMap<String, Vec<RenderedPart>>,
    /// Content outside sections.
    pub main: Vec<RenderedPart>,
    /// Components listed by the settings block and the page.
    pub components: Vec<String>,
    /// Page front matter keys not interpreted by composition.
    pub extra: Attributes,
    /// Validation findings collected while rendering components.
    pub diagnostics: Vec<String>,
}

impl RenderPlan {
    /// HTML of a named section, `None` when the page does not define it.
    #[must_use]
    pub fn section_html(&self, name: &str) -> Option<String> {
        self.sections.get(name).map(|parts| join_html(parts))
    }

    /// HTML of the main content.
    #[must_use]
    pub fn main_html(&self) -> String {
        join_html(&self.main)
    }
}

fn join_html(parts: &[RenderedPart]) -> String {
    parts.iter().map(RenderedPart::html).collect()
}

/// Per-request inputs besides the page itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeContext<'a> {
    /// Pages of the document, for navigation components.
    pub pages: &'a [PageLink],
    /// Template override of the section the page belongs to.
    pub section_template: Option<&'a str>,
}

/// Builds [`RenderPlan`]s.
pub struct PageComposer<'a> {
    registry: &'a ComponentRegistry,
    site: &'a SiteConfig,
}

/// Where a part belongs in the plan.
#[derive(Clone, Copy)]
enum Slot<'s> {
    Section(&'s str),
    Main,
}

impl<'a> PageComposer<'a> {
    /// Create a composer.
    #[must_use]
    pub fn new(registry: &'a ComponentRegistry, site: &'a SiteConfig) -> Self {
        Self { registry, site }
    }

    /// Compose one page.
    ///
    /// Never fails: unknown components become [`RenderedPart::Missing`] and
    /// validation findings are logged and kept in
    /// [`RenderPlan::diagnostics`].
    #[must_use]
    pub fn compose(
        &self,
        settings: Option<&SettingsBlock>,
        page: &Page,
        context: &ComposeContext<'_>,
    ) -> RenderPlan {
        let config = PageConfig::merge(settings, page);
        let split = sections::split(&page.body);

        let mut jobs: Vec<(Slot<'_>, ContentPart)> = Vec::new();
        for (name, content) in &split.sections {
            jobs.extend(
                component::expand(content)
                    .into_iter()
                    .map(|part| (Slot::Section(name), part)),
            );
        }
        jobs.extend(
            component::expand(&split.main)
                .into_iter()
                .map(|part| (Slot::Main, part)),
        );

        let options = HtmlOptions {
            allow_raw_html: self.site.allow_scripts,
        };
        let rendered: Vec<(RenderedPart, Vec<String>)> = jobs
            .par_iter()
            .map(|(_, part)| self.render_part(part, &config.data, context.pages, &page.id, options))
            .collect();

        let mut plan = RenderPlan {
            template: self.template_name(&config, context.section_template),
            layout: config.layout.clone(),
            title: config
                .title
                .clone()
                .unwrap_or_else(|| self.site.default_title.clone()),
            sections: split
                .sections
                .keys()
                .map(|name| (name.clone(), Vec::new()))
                .collect(),
            components: config.components,
            extra: config.extra,
            data: config.data,
            ..RenderPlan::default()
        };
        for ((slot, _), (part, diagnostics)) in jobs.iter().zip(rendered) {
            plan.diagnostics.extend(diagnostics);
            match slot {
                Slot::Main => plan.main.push(part),
                Slot::Section(name) => plan
                    .sections
                    .entry((*name).to_owned())
                    .or_default()
                    .push(part),
            }
        }
        plan
    }

    /// Template priority: page, section, settings, site configuration.
    fn template_name(&self, config: &PageConfig, section_template: Option<&str>) -> String {
        config
            .template
            .as_deref()
            .or(section_template)
            .or(config.default_template.as_deref())
            .or(Some(self.site.default_template.as_str()).filter(|t| !t.is_empty()))
            .unwrap_or(DEFAULT_TEMPLATE)
            .to_owned()
    }

    fn render_part(
        &self,
        part: &ContentPart,
        data: &Map<String, Value>,
        pages: &[PageLink],
        page_id: &str,
        options: HtmlOptions,
    ) -> (RenderedPart, Vec<String>) {
        match part {
            ContentPart::Text { raw } => {
                let text = interpolate(raw, data);
                (
                    RenderedPart::Html(render_markdown(&text, options)),
                    Vec::new(),
                )
            }
            ContentPart::Component(invocation) => {
                self.render_component(invocation, data, pages, page_id)
            }
        }
    }

    fn render_component(
        &self,
        invocation: &ComponentInvocation,
        data: &Map<String, Value>,
        pages: &[PageLink],
        page_id: &str,
    ) -> (RenderedPart, Vec<String>) {
        let name = invocation.name.as_str();
        let mut props = resolve_props(invocation, data);

        let validation = self.registry.validate(name, &props);
        for error in &validation.errors {
            tracing::warn!(component = name, page = page_id, "{error}");
        }
        for warning in &validation.warnings {
            tracing::warn!(component = name, page = page_id, "{warning}");
        }
        let diagnostics: Vec<String> = validation
            .errors
            .into_iter()
            .chain(validation.warnings)
            .collect();

        let Some(definition) = self.registry.get(name) else {
            return (
                RenderedPart::Missing {
                    name: name.to_owned(),
                },
                diagnostics,
            );
        };

        let component = definition.load();
        definition.schema().apply_defaults(&mut props);
        let ctx = RenderContext {
            props: &props,
            children: invocation.children.as_deref(),
            data,
            pages,
            current_page_id: Some(page_id),
        };
        let html = component.render(&ctx);

        (
            RenderedPart::Component {
                name: name.to_owned(),
                html,
            },
            diagnostics,
        )
    }
}

/// Literal props as JSON, variable props looked up in page data.
///
/// Variables that do not resolve are left out.
fn resolve_props(invocation: &ComponentInvocation, data: &Map<String, Value>) -> Map<String, Value> {
    invocation
        .props
        .iter()
        .filter_map(|(key, value)| {
            let resolved = match value {
                PropValue::Variable { path } => lookup(data, path).cloned(),
                literal => literal.to_json(),
            };
            resolved.map(|v| (key.clone(), v))
        })
        .collect()
}
