//! Section navigation.
//!
//! Each section may ship a `_sidebar.md` with a markdown list of links.
//! Sections without one get a listing generated from the markdown files in
//! the section folder. Navigation is decoration: failures produce an empty
//! navigation, never an error.

use std::sync::LazyLock;

use folio_storage::{EntryKind, Storage};
use regex::Regex;
use serde::Serialize;

/// Sidebar manifest file name.
pub const SIDEBAR_FILE: &str = "_sidebar.md";

/// `- [Title](path)` list item.
static SIDEBAR_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*]\s*\[(.*?)\]\((.*?)\)").expect("invalid sidebar item regex")
});

/// Where the navigation items came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationKind {
    /// Parsed from `_sidebar.md`.
    Sidebar,
    /// Generated from the section's file listing.
    Auto,
    /// Nothing available.
    #[default]
    None,
}

/// One navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Display title.
    pub title: String,
    /// Link target as written in the sidebar, or the repository path.
    pub path: String,
}

impl NavItem {
    fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }
}

/// Navigation for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Source of the items.
    #[serde(rename = "type")]
    pub kind: NavigationKind,
    /// Links in display order.
    pub items: Vec<NavItem>,
}

impl Navigation {
    /// Empty navigation.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Fetch navigation for a section folder.
///
/// Tries `<folder>/_sidebar.md` first and falls back to listing the folder.
pub fn fetch(storage: &dyn Storage, folder: &str) -> Navigation {
    let sidebar_path = if folder.is_empty() {
        SIDEBAR_FILE.to_owned()
    } else {
        format!("{folder}/{SIDEBAR_FILE}")
    };

    match storage.read(&sidebar_path) {
        Ok(content) => {
            return Navigation {
                kind: NavigationKind::Sidebar,
                items: parse_sidebar(&content),
            };
        }
        Err(e) if e.is_not_found() => {
            tracing::debug!(path = %sidebar_path, "No sidebar, listing section folder");
        }
        Err(e) => {
            tracing::debug!(path = %sidebar_path, error = %e, "Sidebar unavailable, listing section folder");
        }
    }

    match storage.tree(folder) {
        Ok(entries) => Navigation {
            kind: NavigationKind::Auto,
            items: entries
                .into_iter()
                .filter(|entry| entry.kind == EntryKind::Blob)
                .filter_map(|entry| {
                    let title = title_from_path(&entry.path)?;
                    Some(NavItem::new(title, entry.path))
                })
                .collect(),
        },
        Err(e) => {
            tracing::warn!(folder, error = %e, "Failed to fetch navigation tree");
            Navigation::none()
        }
    }
}

/// Parse the links of a sidebar manifest.
#[must_use]
pub fn parse_sidebar(markdown: &str) -> Vec<NavItem> {
    markdown
        .lines()
        .filter_map(|line| SIDEBAR_ITEM.captures(line))
        .map(|caps| NavItem::new(&caps[1], &caps[2]))
        .collect()
}

/// Title for a markdown file: `guides/getting-started.md` → `Getting Started`.
///
/// `None` for non-markdown files and for `_`-prefixed support files.
fn title_from_path(path: &str) -> Option<String> {
    let filename = path.rsplit('/').next().unwrap_or(path);
    let stem = filename.strip_suffix(".md")?;
    if stem.starts_with('_') {
        return None;
    }

    let words: Vec<String> = stem
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    Some(words.join(" "))
}
