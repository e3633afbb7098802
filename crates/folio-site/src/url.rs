//! Site URLs.
//!
//! The site is served under `/<repository>/<path>`. A page of a multi-page
//! document is selected with `?page=<id>` or `#<id>`; without either the
//! first page is shown.

use std::borrow::Cow;

use folio_config::Config;
use percent_encoding::percent_decode_str;

/// A request for one page of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRequest {
    /// Virtual path of the document.
    pub path: String,
    /// Requested page id.
    pub page_id: Option<String>,
}

impl SiteRequest {
    /// Create a request.
    #[must_use]
    pub fn new(path: impl Into<String>, page_id: Option<&str>) -> Self {
        Self {
            path: path.into(),
            page_id: page_id.map(str::to_owned),
        }
    }

    /// Parse a site URL.
    ///
    /// Accepts an absolute URL or a path with optional query and fragment.
    /// The `/<repository>` prefix is removed; an empty remainder means the
    /// configured home file. `?page=` takes precedence over the fragment.
    #[must_use]
    pub fn from_url(url: &str, config: &Config) -> Self {
        let url = url.trim();
        let without_origin = match url.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("", |slash| &rest[slash..]),
            None => url,
        };

        let (rest, fragment) = without_origin
            .split_once('#')
            .map_or((without_origin, None), |(rest, fragment)| (rest, Some(fragment)));
        let (path, query) = rest
            .split_once('?')
            .map_or((rest, None), |(path, query)| (path, Some(query)));

        let path = decode(path);
        let path = strip_repository(path.trim_start_matches('/'), &config.site.repository);
        let path = path.trim_matches('/');
        let path = if path.is_empty() {
            config.site.homefile.clone()
        } else {
            path.to_owned()
        };

        let page_id = query
            .and_then(page_param)
            .or_else(|| fragment.map(|f| decode(f).into_owned()))
            .filter(|id| !id.is_empty());

        Self { path, page_id }
    }
}

fn decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

fn strip_repository<'a>(path: &'a str, repository: &str) -> &'a str {
    if repository.is_empty() {
        return path;
    }
    match path.strip_prefix(repository) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Value of the `page` query parameter.
fn page_param(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == "page").then(|| decode(&value.replace('+', " ")).into_owned())
    })
}
