//! Virtual path resolution.
//!
//! A virtual path is what the visitor sees after the repository alias in the
//! URL (`blog/first-post.md`). Resolution normalizes it and routes its first
//! segment through the [`SectionMap`] to a repository path (`posts/first-post.md`).
//!
//! Resolution never fails. Whether the resolved path exists is a storage
//! concern.

use folio_config::{Config, SectionEntry, SectionMap};

/// Normalize a virtual path.
///
/// Trims whitespace and slashes, collapses repeated slashes and drops every
/// `.` and `..` segment. The result never starts with `/` and never contains
/// a `..` segment.
#[must_use]
pub fn normalize(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim()
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// Section map entry routing `path`, with the matched prefix.
///
/// The first segment is matched against the non-empty prefixes; the empty
/// prefix is the fallback.
fn matched_entry<'a>(path: &str, sections: &'a SectionMap) -> Option<(&'a SectionEntry, bool)> {
    let first = segments(path).next().unwrap_or_default();
    if !first.is_empty()
        && let Some(entry) = sections.get(first)
    {
        return Some((entry, true));
    }
    sections.fallback().map(|entry| (entry, false))
}

/// Resolve a virtual path to a repository path.
///
/// The first segment is replaced by the folder of the matching section;
/// without a match the fallback folder (empty prefix) is prepended;
/// without a fallback the normalized path passes through.
///
/// # Example
///
/// ```
/// use folio_config::SectionMap;
/// use folio_site::path::resolve;
///
/// let sections = SectionMap::new().with("blog", "posts").with("", "docs");
/// assert_eq!(resolve("blog/a.md", &sections), "posts/a.md");
/// assert_eq!(resolve("a.md", &sections), "docs/a.md");
/// ```
#[must_use]
pub fn resolve(virtual_path: &str, sections: &SectionMap) -> String {
    let normalized = normalize(virtual_path);
    let joined = match matched_entry(&normalized, sections) {
        Some((entry, true)) => {
            let rest = normalized.split_once('/').map_or("", |(_, rest)| rest);
            format!("{}/{rest}", entry.folder())
        }
        Some((entry, false)) => format!("{}/{normalized}", entry.folder()),
        None => return normalized,
    };
    normalize(&joined)
}

/// Template override of the section routing `virtual_path`.
#[must_use]
pub fn section_template<'a>(virtual_path: &str, sections: &'a SectionMap) -> Option<&'a str> {
    matched_entry(virtual_path, sections).and_then(|(entry, _)| entry.template())
}

/// Section key of `virtual_path`: its first segment when that is a
/// configured prefix, otherwise the empty key.
#[must_use]
pub fn section_key<'a>(virtual_path: &'a str, sections: &SectionMap) -> &'a str {
    match segments(virtual_path).next() {
        Some(first) if sections.get(first).is_some() => first,
        _ => "",
    }
}

/// Path resolution bound to a site configuration.
///
/// Adds the configured documentation root folder in front of every resolved
/// path.
#[derive(Clone, Debug, Default)]
pub struct PathResolver {
    sections: SectionMap,
    docs_folder: String,
}

impl PathResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(sections: SectionMap, docs_folder: Option<&str>) -> Self {
        Self {
            sections,
            docs_folder: docs_folder.map(normalize).unwrap_or_default(),
        }
    }

    /// Create a resolver from site configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sections.clone(), config.site.docs_folder.as_deref())
    }

    /// Section map in use.
    #[must_use]
    pub fn sections(&self) -> &SectionMap {
        &self.sections
    }

    /// Repository path of a virtual path.
    #[must_use]
    pub fn resolve(&self, virtual_path: &str) -> String {
        self.in_docs_folder(&resolve(virtual_path, &self.sections))
    }

    /// Template override of the section routing `virtual_path`.
    #[must_use]
    pub fn section_template(&self, virtual_path: &str) -> Option<&str> {
        section_template(virtual_path, &self.sections)
    }

    /// Repository folder of the section routing `virtual_path`.
    ///
    /// This is where the section's `_sidebar.md` lives.
    #[must_use]
    pub fn section_folder(&self, virtual_path: &str) -> String {
        let key = section_key(virtual_path, &self.sections);
        let folder = self.sections.get(key).map_or("", SectionEntry::folder);
        self.in_docs_folder(&normalize(folder))
    }

    fn in_docs_folder(&self, path: &str) -> String {
        match (self.docs_folder.is_empty(), path.is_empty()) {
            (true, _) => path.to_owned(),
            (false, true) => self.docs_folder.clone(),
            (false, false) => format!("{}/{path}", self.docs_folder),
        }
    }
}
