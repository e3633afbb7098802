//! Site pipeline errors.
//!
//! Path normalization never fails, so there is no path error variant. Parse
//! problems, unknown components and validation findings are recovered inside
//! the pipeline and reported as diagnostics instead of errors.

use folio_storage::StorageError;

/// Terminal failure of a page render.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The markdown document could not be fetched.
    #[error("Failed to fetch content: {0}")]
    Fetch(#[from] StorageError),
    /// The document contains no pages.
    #[error("Document {path} contains no pages")]
    EmptyDocument {
        /// Repository path of the document.
        path: String,
    },
    /// Neither the requested template nor `default` is registered.
    #[error("Template '{0}' not found and no default template is registered")]
    NoTemplate(String),
}

impl SiteError {
    /// Whether this error means the content does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Fetch(e) if e.is_not_found())
    }
}
