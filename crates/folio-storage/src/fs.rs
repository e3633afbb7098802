//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for serving a portfolio from a local checkout of the
//! content repository.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{
    Storage, StorageError, StorageErrorKind, TreeEntry, encode_path, is_under_prefix,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Reads repository paths relative to a root directory. Hidden entries
/// (dot-prefixed) are left out of tree listings.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use folio_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("content"));
/// let home = storage.read("docs/README.md")?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of the checkout.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate that a path doesn't escape the root directory.
    fn validate_path(path: &str) -> Result<(), StorageError> {
        let escapes = Path::new(path)
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    /// Walk `dir` recursively, appending entries with repository paths.
    fn walk(&self, dir: &Path, rel: &str, out: &mut Vec<TreeEntry>) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir)
            .map_err(|e| StorageError::io(e, Some(dir.to_path_buf())).with_backend(BACKEND))?;

        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e.file_name().to_string_lossy().into_owned(), is_dir)
            })
            .filter(|(name, _)| !name.starts_with('.'))
            .collect();
        entries.sort();

        for (name, is_dir) in entries {
            let path = if rel.is_empty() {
                name.clone()
            } else {
                format!("{rel}/{name}")
            };
            if is_dir {
                out.push(TreeEntry::tree(path.clone()));
                self.walk(&dir.join(&name), &path, out)?;
            } else {
                out.push(TreeEntry::blob(path));
            }
        }
        Ok(())
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        Self::validate_path(path)?;
        let full_path = self.root.join(path);
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(path))).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        Self::validate_path(path).is_ok() && self.root.join(path).is_file()
    }

    fn tree(&self, prefix: &str) -> Result<Vec<TreeEntry>, StorageError> {
        let prefix = prefix.trim_matches('/');
        Self::validate_path(prefix)?;

        let start = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(prefix)
        };
        if !start.is_dir() {
            return Err(StorageError::not_found(prefix).with_backend(BACKEND));
        }

        let mut entries = Vec::new();
        self.walk(&start, prefix, &mut entries)?;
        entries.retain(|e| is_under_prefix(&e.path, prefix));

        tracing::debug!(prefix, count = entries.len(), "Listed local tree");
        Ok(entries)
    }

    fn raw_url(&self, path: &str) -> String {
        let root = self.root.to_string_lossy();
        format!(
            "file://{}/{}",
            encode_path(root.trim_end_matches('/')),
            encode_path(path.trim_start_matches('/'))
        )
    }
}
