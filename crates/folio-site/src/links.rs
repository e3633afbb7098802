//! Relative link rewriting.
//!
//! Markdown documents reference images and files next to them with relative
//! targets. The browser resolves those against the site URL, not the
//! repository, so they are rewritten to the storage's raw URL before the
//! document is parsed.

use std::borrow::Cow;
use std::sync::LazyLock;

use folio_storage::Storage;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

use crate::path::PathResolver;

/// `[text](target "title")` and `![alt](target "title")`.
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(([^)\s]+)((?:\s+"[^"]*")?)\)"#).expect("invalid link regex")
});

/// URI scheme prefix (`https:`, `data:`, `mailto:`).
static SCHEME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("invalid scheme regex")
});

/// Rewrites relative markdown links to raw storage URLs.
pub struct LinkRewriter<'a> {
    resolver: &'a PathResolver,
    storage: &'a dyn Storage,
}

impl<'a> LinkRewriter<'a> {
    /// Create a rewriter.
    #[must_use]
    pub fn new(resolver: &'a PathResolver, storage: &'a dyn Storage) -> Self {
        Self { resolver, storage }
    }

    /// Rewrite relative links and images in `markdown`.
    ///
    /// `current_path` is the virtual path of the document; targets resolve
    /// against its directory. Absolute URLs, `data:` URIs, anchors and
    /// root-relative links are left alone, as are links to other markdown
    /// files, which stay site navigation.
    #[must_use]
    pub fn rewrite<'m>(&self, markdown: &'m str, current_path: &str) -> Cow<'m, str> {
        if !markdown.contains("](") {
            return Cow::Borrowed(markdown);
        }

        LINK_PATTERN.replace_all(markdown, |caps: &Captures<'_>| {
            let is_image = !caps[1].is_empty();
            let target = &caps[3];
            if !should_rewrite(target, is_image) {
                return caps[0].to_owned();
            }

            let split = target.find(['#', '?']).unwrap_or(target.len());
            let (path, suffix) = target.split_at(split);
            // Storage re-encodes the repository path.
            let path = percent_decode_str(path).decode_utf8_lossy();
            let virtual_path = join_relative(current_path, &path);
            let url = self.storage.raw_url(&self.resolver.resolve(&virtual_path));
            tracing::debug!(link = target, %url, "Rewrote relative link");

            format!("{}[{}]({url}{suffix}{})", &caps[1], &caps[2], &caps[4])
        })
    }
}

fn should_rewrite(target: &str, is_image: bool) -> bool {
    if SCHEME_PATTERN.is_match(target) || target.starts_with("//") {
        return false;
    }
    if is_image {
        return true;
    }
    if target.starts_with('/') || target.starts_with('#') {
        return false;
    }
    let path = target.split(['#', '?']).next().unwrap_or_default();
    !path.ends_with(".md")
}

/// Join a relative target onto the directory of `current_path`.
///
/// `..` pops one directory and stops at the root; a leading `/` makes the
/// target relative to the root.
fn join_relative(current_path: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        let mut dir: Vec<&str> = current_path.split('/').filter(|s| !s.is_empty()).collect();
        dir.pop();
        dir
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
