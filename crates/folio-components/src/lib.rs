//! Components for Folio pages.
//!
//! Markdown content invokes components with `{{Name prop="value"}}`. This
//! crate owns what happens after parsing:
//!
//! - [`ComponentRegistry`] maps names to factories and property schemas
//! - [`PropSchema::validate`] checks invocation properties (non-fatal)
//! - [`Component`] renders one invocation to an HTML fragment
//!
//! Built-ins: `Typewriter`, `Avatar`, `SocialLinks`, `Button`, `Highlight`,
//! `PageNavigation`.

mod builtin;
mod component;
mod global;
mod registry;
mod schema;

pub use component::{Component, PageLink, RenderContext};
pub use global::{global, init_global, reset_global};
pub use registry::{ComponentDefinition, ComponentDocs, ComponentRegistry, PropDoc};
pub use schema::{PropSchema, PropSpec, PropType, Validation};
