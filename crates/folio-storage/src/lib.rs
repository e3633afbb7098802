//! Content storage abstraction for Folio.
//!
//! This crate provides a [`Storage`] trait for fetching markdown documents and
//! repository listings from wherever the content repository lives. This
//! enables:
//!
//! - **Unit testing** without touching the network
//! - **Backend flexibility** (GitHub, local checkout)
//! - **Clean separation** between the rendering pipeline and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()`, `exists()`, `tree()` and `raw_url()`
//! - [`GithubStorage`] reading raw files and git trees from GitHub
//! - [`FsStorage`] reading from a local checkout
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use folio_storage::{GithubStorage, Storage};
//!
//! let storage = GithubStorage::new("octocat", "portfolio", "main");
//! let markdown = storage.read("docs/README.md")?;
//! ```

mod fs;
mod github;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
pub use github::GithubStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{EntryKind, Storage, StorageError, StorageErrorKind, TreeEntry};
