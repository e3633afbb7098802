//! Named sections inside a page body.
//!
//! ```text
//! ::: section hero-left
//! # Hi, I'm Ada
//! :::
//! Everything else is main content.
//! ```
//!
//! Regions don't nest. An unclosed region runs to the end of the body, and a
//! repeated name replaces the earlier region's content.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static OPEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:{3,}\s+section\s+([A-Za-z0-9-]+)\s*$").expect("invalid section regex")
});

/// Body split into sections and main content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSections {
    /// Section name to trimmed content.
    pub sections: BTreeMap<String, String>,
    /// Text outside all sections, trimmed.
    pub main: String,
}

/// Split a page body into named sections and main content.
#[must_use]
pub fn split(body: &str) -> SplitSections {
    let mut sections = BTreeMap::new();
    let mut main = String::new();
    // (name, byte offset where content starts)
    let mut open: Option<(&str, usize)> = None;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        match open {
            None => {
                if let Some(caps) = OPEN_PATTERN.captures(content) {
                    let name = caps.get(1).map_or("", |m| m.as_str());
                    open = Some((name, offset + line.len()));
                } else {
                    main.push_str(line);
                }
            }
            Some((name, start)) => {
                if is_close_line(content) {
                    sections.insert(name.to_owned(), body[start..offset].trim().to_owned());
                    open = None;
                }
            }
        }
        offset += line.len();
    }

    if let Some((name, start)) = open {
        sections.insert(name.to_owned(), body[start..].trim().to_owned());
    }

    SplitSections {
        sections,
        main: main.trim().to_owned(),
    }
}

fn is_close_line(line: &str) -> bool {
    let colons = line.len() - line.trim_start_matches(':').len();
    colons >= 3 && line[colons..].trim().is_empty()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_single_section() {
        let split = split("::: section hero\nHi\n:::\nMain text");

        assert_eq!(split.sections.len(), 1);
        assert_eq!(split.sections["hero"], "Hi");
        assert_eq!(split.main, "Main text");
    }

    #[test]
    fn test_main_keeps_relative_order() {
        let body = "Intro\n\n:::: section left\n  A  \n::::\nMiddle\n::: section right\nB\n:::\nOutro";
        let split = split(body);

        assert_eq!(split.sections["left"], "A");
        assert_eq!(split.sections["right"], "B");
        assert_eq!(split.main, "Intro\n\nMiddle\nOutro");
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let split = split("::: section a\nfirst\n:::\n::: section a\nsecond\n:::");

        assert_eq!(split.sections["a"], "second");
        assert_eq!(split.main, "");
    }

    #[test]
    fn test_unterminated_runs_to_end() {
        let split = split("Before\n::: section tail\nrest\nof body");

        assert_eq!(split.sections["tail"], "rest\nof body");
        assert_eq!(split.main, "Before");
    }

    #[test]
    fn test_no_nesting() {
        let split = split("::: section outer\n::: section inner\nx\n:::\nafter\n:::");

        assert_eq!(split.sections["outer"], "::: section inner\nx");
        assert!(!split.sections.contains_key("inner"));
        assert_eq!(split.main, "after\n:::");
    }

    #[test]
    fn test_invalid_names_are_text() {
        let split = split("::: section bad_name\n::: sections x\n:: section y\nbody");

        assert!(split.sections.is_empty());
        assert_eq!(
            split.main,
            "::: section bad_name\n::: sections x\n:: section y\nbody"
        );
    }

    #[test]
    fn test_crlf() {
        let split = split("::: section a \r\nA\r\n:::\r\nMain");

        assert_eq!(split.sections["a"], "A");
        assert_eq!(split.main, "Main");
    }

    #[test]
    fn test_idempotent_on_main() {
        let inputs = [
            "::: section hero\nHi\n:::\nMain text",
            "a\n:::\nb\n::: section x\ny",
            "no sections at all",
            "::: section outer\n::: section inner\nx\n:::\nafter\n:::",
        ];
        for input in inputs {
            let first = split(input);
            let second = split(&first.main);
            assert_eq!(second.main, first.main);
            assert!(second.sections.is_empty());
        }
    }
}
