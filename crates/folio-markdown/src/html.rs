//! Markdown to HTML.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

/// Options for [`render_markdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Pass raw HTML and any URL scheme through. When false, raw HTML is
    /// escaped and shown as text, and unsafe link and image URLs are replaced
    /// with `#`.
    pub allow_raw_html: bool,
}

/// Where a URL ends up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// `href` of a link.
    Link,
    /// `src` of an image.
    Image,
}

/// Replacement for URLs rejected by [`is_safe_url`].
pub const BLOCKED_URL: &str = "#";

/// Whether `url` may appear in a link or image of sanitized output.
///
/// Relative URLs and `http`, `https` and `mailto` are allowed; images also
/// accept `data:image/...`. Whitespace and control characters are ignored
/// while reading the scheme, as browsers do.
#[must_use]
pub fn is_safe_url(url: &str, kind: UrlKind) -> bool {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let Some(colon) = compact.find(':') else {
        return true;
    };
    let scheme = &compact[..colon];
    if scheme.contains(['/', '?', '#']) {
        return true;
    }

    match scheme.to_ascii_lowercase().as_str() {
        "http" | "https" | "mailto" => true,
        "data" => {
            kind == UrlKind::Image
                && compact[colon + 1..]
                    .to_ascii_lowercase()
                    .starts_with("image/")
        }
        _ => false,
    }
}

fn sanitize_url(url: CowStr<'_>, kind: UrlKind) -> CowStr<'_> {
    if is_safe_url(&url, kind) {
        url
    } else {
        tracing::debug!(url = %url, "Blocked unsafe URL");
        CowStr::Borrowed(BLOCKED_URL)
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render markdown text to an HTML fragment.
#[must_use]
pub fn render_markdown(markdown: &str, options: HtmlOptions) -> String {
    let parser = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        _ if options.allow_raw_html => event,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_url(dest_url, UrlKind::Link),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_url(dest_url, UrlKind::Image),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = render_markdown("# Title\n\nSome **bold** text.", HtmlOptions::default());

        assert_eq!(html, "<h1>Title</h1>\n<p>Some <strong>bold</strong> text.</p>\n");
    }

    #[test]
    fn test_tables_and_strikethrough() {
        let html = render_markdown("| a |\n|---|\n| ~~b~~ |", HtmlOptions::default());

        assert!(html.contains("<table>"));
        assert!(html.contains("<del>b</del>"));
    }

    #[test]
    fn test_raw_html_escaped_by_default() {
        let html = render_markdown("<script>alert(1)</script>", HtmlOptions::default());

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_inline_html_escaped_by_default() {
        let html = render_markdown("a <b onclick=\"x\">b</b>", HtmlOptions::default());

        assert!(!html.contains("<b "));
        assert!(html.contains("&lt;b onclick"));
    }

    #[test]
    fn test_raw_html_allowed() {
        let options = HtmlOptions {
            allow_raw_html: true,
        };
        let html = render_markdown("<div class=\"x\">hi</div>", options);

        assert!(html.contains("<div class=\"x\">hi</div>"));
    }

    #[test]
    fn test_script_urls_blocked_by_default() {
        let html = render_markdown(
            "[click](javascript:alert(1)) [b](JavaScript&#58;x) ![i](vbscript:x)",
            HtmlOptions::default(),
        );

        assert!(!html.to_lowercase().contains("script:"));
        assert!(html.contains("<a href=\"#\">click</a>"));
        assert!(html.contains("<img src=\"#\" alt=\"i\""));
    }

    #[test]
    fn test_safe_urls_kept() {
        let html = render_markdown(
            "[a](https://x.io) [b](mailto:a@b.c) [c](../docs/a.md#top) ![d](data:image/png;base64,AA)",
            HtmlOptions::default(),
        );

        assert!(html.contains("href=\"https://x.io\""));
        assert!(html.contains("href=\"mailto:a@b.c\""));
        assert!(html.contains("href=\"../docs/a.md#top\""));
        assert!(html.contains("src=\"data:image/png;base64,AA\""));
    }

    #[test]
    fn test_script_urls_kept_when_allowed() {
        let options = HtmlOptions {
            allow_raw_html: true,
        };
        let html = render_markdown("[x](javascript:void(0))", options);

        assert!(html.contains("href=\"javascript:void(0)\""));
    }

    #[test]
    fn test_is_safe_url() {
        assert!(is_safe_url("img/a.png", UrlKind::Image));
        assert!(is_safe_url("/about?x=a:b", UrlKind::Link));
        assert!(is_safe_url("HTTPS://x.io", UrlKind::Link));
        assert!(!is_safe_url(" java\tscript:alert(1)", UrlKind::Link));
        assert!(!is_safe_url("data:text/html,<b>", UrlKind::Image));
        assert!(!is_safe_url("data:image/png;base64,AA", UrlKind::Link));
        assert!(!is_safe_url("file:///etc/passwd", UrlKind::Link));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }
}
