//! GitHub storage implementation.
//!
//! Files are fetched from the raw content host and listings come from the git
//! trees API:
//!
//! - `{raw_base}/{account}/{repository}/{branch}/{path}`
//! - `{api_base}/repos/{account}/{repository}/git/trees/{branch}?recursive=1`

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

use crate::storage::{
    Storage, StorageError, StorageErrorKind, TreeEntry, encode_path, is_under_prefix,
};

/// Backend identifier for error messages.
const BACKEND: &str = "GitHub";

const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create HTTP agent with the specified timeout.
///
/// Status codes are inspected by the caller, so they are not turned into
/// transport errors.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Storage backed by a public GitHub repository.
pub struct GithubStorage {
    agent: Agent,
    account: String,
    repository: String,
    branch: String,
    raw_base: String,
    api_base: String,
}

impl GithubStorage {
    /// Create storage for `account/repository` at `branch`.
    #[must_use]
    pub fn new(
        account: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            agent: create_agent(DEFAULT_TIMEOUT),
            account: account.into(),
            repository: repository.into(),
            branch: branch.into(),
            raw_base: DEFAULT_RAW_BASE.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }

    /// Point the storage at different hosts (mirrors, local test servers).
    #[must_use]
    pub fn with_base_urls(mut self, raw_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.raw_base = raw_base.into().trim_end_matches('/').to_owned();
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Replace the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base, self.account, self.repository, self.branch
        )
    }

    /// GET `url` and return the body on success.
    fn get(&self, url: &str, path: &str) -> Result<String, StorageError> {
        tracing::debug!(url, "Fetching");

        let response = self
            .agent
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .call()
            .map_err(|e| transport_error(e, path))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if let Some(err) = error_for_status(status, path) {
            tracing::warn!(url, status, "Content host returned an error");
            return Err(err);
        }

        body.read_to_string().map_err(|e| {
            StorageError::new(StorageErrorKind::Network)
                .with_path(path)
                .with_backend(BACKEND)
                .with_source(e)
        })
    }
}

impl Storage for GithubStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        let path = path.trim_start_matches('/');
        if path.split('/').any(|segment| segment == "..") {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        self.get(&self.raw_url(path), path)
    }

    fn tree(&self, prefix: &str) -> Result<Vec<TreeEntry>, StorageError> {
        let body = self.get(&self.tree_url(), prefix)?;
        let entries = parse_tree(&body, prefix)?;
        tracing::debug!(prefix, count = entries.len(), "Listed repository tree");
        Ok(entries)
    }

    fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base,
            self.account,
            self.repository,
            self.branch,
            encode_path(path.trim_start_matches('/'))
        )
    }
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Parse a git trees API response and keep entries under `prefix`.
fn parse_tree(body: &str, prefix: &str) -> Result<Vec<TreeEntry>, StorageError> {
    let response: TreeResponse = serde_json::from_str(body).map_err(|e| {
        StorageError::new(StorageErrorKind::Other)
            .with_backend(BACKEND)
            .with_source(e)
    })?;

    if response.truncated {
        tracing::warn!(prefix, "Repository tree listing was truncated");
    }

    Ok(response
        .tree
        .into_iter()
        .filter(|entry| is_under_prefix(&entry.path, prefix))
        .collect())
}

/// Map an HTTP status to a storage error (`None` for success).
fn error_for_status(status: u16, path: &str) -> Option<StorageError> {
    let kind = match status {
        200..=399 => return None,
        404 => StorageErrorKind::NotFound,
        403 | 429 => StorageErrorKind::RateLimited,
        401 => StorageErrorKind::PermissionDenied,
        500.. => StorageErrorKind::Network,
        _ => StorageErrorKind::Other,
    };
    Some(
        StorageError::new(kind)
            .with_path(path)
            .with_backend(BACKEND)
            .with_source(HttpStatus(status)),
    )
}

fn transport_error(err: ureq::Error, path: &str) -> StorageError {
    let kind = match err {
        ureq::Error::Timeout(_) => StorageErrorKind::Timeout,
        _ => StorageErrorKind::Network,
    };
    StorageError::new(kind)
        .with_path(path)
        .with_backend(BACKEND)
        .with_source(err)
}

/// Non-success HTTP status carried as an error source.
#[derive(Debug)]
struct HttpStatus(u16);

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

impl std::error::Error for HttpStatus {}
