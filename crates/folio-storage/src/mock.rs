//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without network access.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::storage::{
    Storage, StorageError, StorageErrorKind, TreeEntry, encode_path, is_under_prefix,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores file contents in memory. Directory entries for tree listings are
/// derived from the stored file paths. Every `read` call is recorded so tests
/// can assert which files were fetched and in what order.
///
/// # Example
///
/// ```ignore
/// use folio_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("docs/README.md", "# Home")
///     .with_error("docs/broken.md", StorageErrorKind::Network);
///
/// assert_eq!(storage.read("docs/README.md").unwrap(), "# Home");
/// assert_eq!(storage.reads(), vec!["docs/README.md"]);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<String, String>>,
    errors: RwLock<HashMap<String, StorageErrorKind>>,
    reads: Mutex<Vec<String>>,
    tree_error: RwLock<bool>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Make reads of `path` fail with `kind`.
    #[must_use]
    pub fn with_error(self, path: impl Into<String>, kind: StorageErrorKind) -> Self {
        self.errors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), kind);
        self
    }

    /// Make every tree listing fail.
    #[must_use]
    pub fn with_tree_error(self) -> Self {
        *self.tree_error.write().unwrap_or_else(PoisonError::into_inner) = true;
        self
    }

    /// Insert or replace a file after construction.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), content.into());
    }

    /// Paths passed to [`Storage::read`], in call order.
    #[must_use]
    pub fn reads(&self) -> Vec<String> {
        self.reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget recorded reads.
    pub fn clear_reads(&self) {
        self.reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        self.reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());

        if let Some(&kind) = self
            .errors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return Err(StorageError::new(kind)
                .with_path(path)
                .with_backend(BACKEND));
        }

        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    fn tree(&self, prefix: &str) -> Result<Vec<TreeEntry>, StorageError> {
        if *self.tree_error.read().unwrap_or_else(PoisonError::into_inner) {
            return Err(StorageError::new(StorageErrorKind::Network).with_backend(BACKEND));
        }

        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut dirs = BTreeSet::new();
        for path in files.keys() {
            let mut end = 0;
            while let Some(pos) = path[end..].find('/') {
                end += pos;
                dirs.insert(path[..end].to_owned());
                end += 1;
            }
        }

        let mut entries: Vec<TreeEntry> = dirs
            .into_iter()
            .map(TreeEntry::tree)
            .chain(files.keys().cloned().map(TreeEntry::blob))
            .filter(|e| is_under_prefix(&e.path, prefix))
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn raw_url(&self, path: &str) -> String {
        format!("https://mock.test/{}", encode_path(path.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_read_and_record() {
        let storage = MockStorage::new().with_file("docs/a.md", "A");

        assert_eq!(storage.read("docs/a.md").unwrap(), "A");
        assert!(storage.read("docs/b.md").unwrap_err().is_not_found());
        assert_eq!(storage.reads(), vec!["docs/a.md", "docs/b.md"]);

        storage.clear_reads();
        assert!(storage.reads().is_empty());
    }

    #[test]
    fn test_injected_error() {
        let storage = MockStorage::new()
            .with_file("docs/a.md", "A")
            .with_error("docs/a.md", StorageErrorKind::Timeout);

        let err = storage.read("docs/a.md").unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::Timeout);
        assert_eq!(err.backend, Some("Mock"));
    }

    #[test]
    fn test_tree_derives_directories() {
        let storage = MockStorage::new()
            .with_file("docs/README.md", "")
            .with_file("docs/posts/first.md", "")
            .with_file("other.md", "");

        let entries = storage.tree("docs").unwrap();

        assert_eq!(
            entries,
            vec![
                TreeEntry::blob("docs/README.md"),
                TreeEntry::tree("docs/posts"),
                TreeEntry::blob("docs/posts/first.md"),
            ]
        );
    }

    #[test]
    fn test_tree_error() {
        let storage = MockStorage::new().with_tree_error();

        assert_eq!(storage.tree("").unwrap_err().kind, StorageErrorKind::Network);
    }

    #[test]
    fn test_insert_after_construction() {
        let storage = MockStorage::new();
        storage.insert("a.md", "late");

        assert!(storage.exists("a.md"));
        assert_eq!(storage.raw_url("/a.md"), "https://mock.test/a.md");
        assert_eq!(storage.raw_url("my notes/a.md"), "https://mock.test/my%20notes/a.md");
    }
}
