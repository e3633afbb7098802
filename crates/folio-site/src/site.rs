//! Site pipeline.
//!
//! [`Site`] ties the pieces together for one request:
//!
//! 1. resolve the virtual path through the section map
//! 2. fetch the document from [`Storage`]
//! 3. rewrite relative links, parse pages, select the requested page
//! 4. compose the page and fetch section navigation
//! 5. render through the page's template
//!
//! A failed fetch is terminal and produces the error page; everything after
//! the fetch degrades instead of failing.
//!
//! # Navigation
//!
//! [`Site::navigate`] implements last-navigation-wins: each call takes a
//! generation number and only publishes its output if no newer navigation
//! started in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use folio_components::{ComponentRegistry, PageLink};
use folio_config::Config;
use folio_markdown::document;
use folio_storage::Storage;

use crate::composer::{ComposeContext, PageComposer};
use crate::error::SiteError;
use crate::links::LinkRewriter;
use crate::navigation;
use crate::path::PathResolver;
use crate::template::{PageView, TemplateRegistry, render_error_page};
use crate::url::SiteRequest;

/// Output of one navigation.
#[derive(Debug)]
pub struct Rendered {
    /// Request that produced this output.
    pub request: SiteRequest,
    /// Navigation generation.
    pub generation: u64,
    /// Complete HTML document: the page or the error page.
    pub html: String,
    /// Page view, `None` when the error page was rendered.
    pub view: Option<PageView>,
    /// Terminal error, `None` when the page was rendered.
    pub error: Option<SiteError>,
}

/// Result of [`Site::navigate`].
#[derive(Debug)]
pub enum Navigated {
    /// Output was published and is now [`Site::current`].
    Published(Arc<Rendered>),
    /// A newer navigation started first; output was discarded.
    Superseded,
}

/// Renders pages of a content repository.
///
/// # Thread Safety
///
/// `Site` is shared across threads. Renders run without locking; only
/// publishing takes the write lock on the current output.
pub struct Site {
    storage: Arc<dyn Storage>,
    config: Arc<Config>,
    resolver: PathResolver,
    registry: Arc<ComponentRegistry>,
    templates: TemplateRegistry,
    /// Latest navigation generation handed out.
    generation: AtomicU64,
    /// Latest published output.
    current: RwLock<Option<Arc<Rendered>>>,
}

impl Site {
    /// Create a site.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        config: Arc<Config>,
        registry: Arc<ComponentRegistry>,
        templates: TemplateRegistry,
    ) -> Self {
        let resolver = PathResolver::from_config(&config);
        Self {
            storage,
            config,
            resolver,
            registry,
            templates,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Site configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path resolver built from the configuration.
    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Fetch, parse and compose the requested page.
    pub fn render(&self, request: &SiteRequest) -> Result<PageView, SiteError> {
        let repo_path = self.resolver.resolve(&request.path);
        tracing::debug!(path = %request.path, %repo_path, "Fetching document");
        let raw = self.storage.read(&repo_path)?;

        let markdown = LinkRewriter::new(&self.resolver, self.storage.as_ref())
            .rewrite(&raw, &request.path);
        let doc = document::parse(&markdown);
        for warning in &doc.warnings {
            tracing::debug!(path = %repo_path, "Parse warning: {warning}");
        }

        let page = doc
            .select(request.page_id.as_deref())
            .ok_or_else(|| SiteError::EmptyDocument {
                path: repo_path.clone(),
            })?;
        if let Some(requested) = request.page_id.as_deref()
            && requested != page.id
        {
            tracing::debug!(requested, shown = %page.id, "Page not found, showing first page");
        }

        let pages: Vec<PageLink> = doc
            .pages
            .iter()
            .map(|p| PageLink {
                id: p.id.clone(),
                title: p.title().unwrap_or(&p.id).to_owned(),
            })
            .collect();
        let context = ComposeContext {
            pages: &pages,
            section_template: self.resolver.section_template(&request.path),
        };
        let plan = PageComposer::new(&self.registry, &self.config.site).compose(
            doc.settings.as_ref(),
            page,
            &context,
        );

        let navigation =
            navigation::fetch(self.storage.as_ref(), &self.resolver.section_folder(&request.path));

        Ok(PageView {
            plan,
            path: request.path.clone(),
            current_page_id: page.id.clone(),
            total_pages: pages.len(),
            pages,
            navigation,
        })
    }

    /// Render the requested page to a complete HTML document.
    pub fn render_html(&self, request: &SiteRequest) -> Result<(PageView, String), SiteError> {
        let view = self.render(request)?;
        let html = self.templates.resolve(&view.plan.template)?.render(&view);
        Ok((view, html))
    }

    /// Render and publish, unless a newer navigation started meanwhile.
    pub fn navigate(&self, request: SiteRequest) -> Navigated {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (html, view, error) = match self.render_html(&request) {
            Ok((view, html)) => (html, Some(view), None),
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Failed to render page");
                let html = render_error_page(&request.path, &self.config.site.branch, &e);
                (html, None, Some(e))
            }
        };

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, path = %request.path, "Navigation superseded");
            return Navigated::Superseded;
        }

        let rendered = Arc::new(Rendered {
            request,
            generation,
            html,
            view,
            error,
        });
        *current = Some(Arc::clone(&rendered));
        Navigated::Published(rendered)
    }

    /// Latest published output.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Rendered>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
