//! Section map: virtual path prefixes to repository folders.
//!
//! A section map routes the first segment of a virtual site path to a folder
//! in the content repository. The empty prefix is the fallback used when no
//! other prefix matches.
//!
//! ```toml
//! [sections]
//! "" = "docs"
//! blog = "posts"
//! guides = { folder = "guides", template = "article" }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// One section map entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SectionEntry {
    /// Plain folder name: `blog = "posts"`.
    Folder(String),
    /// Folder with a template override.
    Detailed {
        /// Repository folder.
        folder: String,
        /// Template used for pages in this section unless the page names one.
        #[serde(default)]
        template: Option<String>,
    },
}

impl SectionEntry {
    /// Repository folder this entry maps to.
    #[must_use]
    pub fn folder(&self) -> &str {
        match self {
            Self::Folder(folder) | Self::Detailed { folder, .. } => folder,
        }
    }

    /// Template override for this section, if any.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::Folder(_) => None,
            Self::Detailed { template, .. } => template.as_deref(),
        }
    }
}

impl From<&str> for SectionEntry {
    fn from(folder: &str) -> Self {
        Self::Folder(folder.to_owned())
    }
}

/// Mapping from virtual path prefix to [`SectionEntry`].
///
/// Prefixes are single path segments, so they never overlap. Iteration is
/// sorted by prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SectionMap {
    entries: BTreeMap<String, SectionEntry>,
}

impl SectionMap {
    /// Create an empty section map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    #[must_use]
    pub fn with(mut self, prefix: impl Into<String>, entry: impl Into<SectionEntry>) -> Self {
        self.insert(prefix, entry);
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, prefix: impl Into<String>, entry: impl Into<SectionEntry>) {
        self.entries.insert(prefix.into(), entry.into());
    }

    /// Look up the entry for an exact prefix.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&SectionEntry> {
        self.entries.get(prefix)
    }

    /// Entry registered under the empty prefix.
    #[must_use]
    pub fn fallback(&self) -> Option<&SectionEntry> {
        self.entries.get("")
    }

    /// Iterate over `(prefix, entry)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<SectionEntry>> FromIterator<(K, V)> for SectionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (prefix, entry) in iter {
            map.insert(prefix, entry);
        }
        map
    }
}
