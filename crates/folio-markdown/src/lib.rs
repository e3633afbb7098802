//! Markdown document model for Folio.
//!
//! Turns the raw text of one markdown file into structure the site pipeline
//! can compose:
//!
//! - [`document::parse`] splits a document into an optional
//!   [`SettingsBlock`] and ordered [`Page`]s
//! - [`sections::split`] separates named `::: section` regions from main
//!   content
//! - [`component::expand`] finds `{{Component}}` invocations
//! - [`interpolate()`] fills `{{variable.path}}` placeholders
//! - [`html::render_markdown`] renders text parts to HTML
//!
//! # Example
//!
//! ```ignore
//! use folio_markdown::{component, document, sections};
//!
//! let doc = document::parse(raw);
//! let page = doc.select(Some("about")).unwrap();
//! let split = sections::split(&page.body);
//! let parts = component::expand(&split.main);
//! ```

pub mod component;
pub mod document;
pub mod frontmatter;
pub mod html;
pub mod interpolate;
pub mod sections;

pub use component::{ComponentInvocation, ContentPart, PropValue, Props};
pub use document::{Page, ParseWarning, ParsedDocument, SettingsBlock};
pub use frontmatter::{Attributes, FrontmatterError};
pub use html::{BLOCKED_URL, HtmlOptions, UrlKind, escape_html, is_safe_url, render_markdown};
pub use interpolate::{interpolate, lookup};
pub use sections::SplitSections;
