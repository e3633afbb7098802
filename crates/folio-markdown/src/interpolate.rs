//! Variable placeholders: `{{dotted.path}}`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([a-z][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\}\}")
        .expect("invalid variable regex")
});

/// Look up a dotted path (`profile.links.0.url`) in a data map.
///
/// Numeric segments index into arrays.
#[must_use]
pub fn lookup<'a>(data: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replace `{{dotted.path}}` placeholders with values from `data`.
///
/// Missing paths and `null` values leave the placeholder as written.
#[must_use]
pub fn interpolate<'a>(text: &'a str, data: &Map<String, Value>) -> Cow<'a, str> {
    if !text.contains("{{") {
        return Cow::Borrowed(text);
    }

    VARIABLE_PATTERN.replace_all(text, |caps: &Captures<'_>| {
        let path = caps.get(1).map_or("", |m| m.as_str());
        match lookup(data, path) {
            None | Some(Value::Null) => caps[0].to_owned(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn data() -> Map<String, Value> {
        match json!({
            "name": "Ada",
            "years": 7,
            "remote": true,
            "profile": {"role": "Engineer", "links": [{"url": "https://a.dev"}]},
            "nothing": null
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_lookup() {
        let data = data();

        assert_eq!(lookup(&data, "name"), Some(&json!("Ada")));
        assert_eq!(lookup(&data, "profile.role"), Some(&json!("Engineer")));
        assert_eq!(
            lookup(&data, "profile.links.0.url"),
            Some(&json!("https://a.dev"))
        );
        assert_eq!(lookup(&data, "profile.links.3"), None);
        assert_eq!(lookup(&data, "name.first"), None);
        assert_eq!(lookup(&data, "missing"), None);
    }

    #[test]
    fn test_interpolate_values() {
        let text = "{{name}} ({{profile.role}}), {{years}} years, remote: {{remote}}";

        assert_eq!(
            interpolate(text, &data()),
            "Ada (Engineer), 7 years, remote: true"
        );
    }

    #[test]
    fn test_missing_paths_stay_literal() {
        let text = "Hi {{missing.path}} and {{nothing}}";

        assert_eq!(interpolate(text, &data()), text);
    }

    #[test]
    fn test_components_not_touched() {
        let text = "{{Avatar src=x}} {{Name}} {{ name }}";

        assert_eq!(interpolate(text, &data()), text);
    }

    #[test]
    fn test_no_placeholders_borrows() {
        assert!(matches!(interpolate("plain", &data()), Cow::Borrowed("plain")));
    }
}
