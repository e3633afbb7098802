//! Page composition and site pipeline for Folio.
//!
//! Takes a request for a virtual site path and produces a complete HTML
//! page from markdown stored in a content repository:
//!
//! - [`path`] maps virtual paths to repository paths through the section map
//! - [`PageComposer`] turns a parsed page into a [`RenderPlan`]
//! - [`TemplateRegistry`] renders plans into HTML documents
//! - [`Site`] runs the whole pipeline and implements last-navigation-wins
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_components::ComponentRegistry;
//! use folio_site::{Site, SiteRequest, TemplateRegistry};
//! use folio_storage::GithubStorage;
//!
//! let config = Arc::new(folio_config::Config::load(None, None)?);
//! let storage = Arc::new(GithubStorage::new(
//!     &config.site.github_account,
//!     &config.site.repository,
//!     &config.site.branch,
//! ));
//! let site = Site::new(
//!     storage,
//!     Arc::clone(&config),
//!     folio_components::global(),
//!     TemplateRegistry::with_builtins(),
//! );
//!
//! let request = SiteRequest::from_url("/portfolio/blog/intro.md?page=2", &config);
//! let html = site.render_html(&request)?.1;
//! ```

mod composer;
mod error;
mod links;
pub mod navigation;
mod page_config;
pub mod path;
mod site;
mod template;
mod url;

pub use composer::{ComposeContext, DEFAULT_TEMPLATE, PageComposer, RenderPlan, RenderedPart};
pub use error::SiteError;
pub use links::LinkRewriter;
pub use navigation::{NavItem, Navigation, NavigationKind};
pub use page_config::{PageConfig, deep_merge};
pub use path::PathResolver;
pub use site::{Navigated, Rendered, Site};
pub use template::{PageView, Template, TemplateRegistry, render_error_page};
pub use url::SiteRequest;
