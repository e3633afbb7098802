//! Property schemas and validation.
//!
//! Validation is permissive: only a missing required property is an error.
//! Unknown properties and type mismatches are warnings.

use folio_markdown::frontmatter::value_kind;
use serde::Serialize;
use serde_json::{Map, Value};

/// Declared type of a component property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    /// Text.
    String,
    /// `true` / `false`.
    Boolean,
    /// Integer or float.
    Number,
    /// List.
    Array,
    /// Mapping.
    Object,
}

impl PropType {
    /// Type name as shown in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether `value` has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Number, Value::Number(_))
                | (Self::Array, Value::Array(_))
                | (Self::Object, Value::Object(_))
        )
    }
}

impl std::fmt::Display for PropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declaration of one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropSpec {
    /// Declared type.
    pub prop_type: PropType,
    /// Whether the property must be present.
    pub required: bool,
    /// Value used when the property is absent.
    pub default: Option<Value>,
    /// Human-readable description.
    pub description: &'static str,
}

impl PropSpec {
    /// Optional property without default.
    #[must_use]
    pub fn new(prop_type: PropType, description: &'static str) -> Self {
        Self {
            prop_type,
            required: false,
            default: None,
            description,
        }
    }

    /// Mark the property as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Ordered set of property declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropSchema {
    props: Vec<(&'static str, PropSpec)>,
}

impl PropSchema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, builder style. Re-declaring a name replaces it.
    #[must_use]
    pub fn prop(mut self, name: &'static str, spec: PropSpec) -> Self {
        if let Some(slot) = self.props.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = spec;
        } else {
            self.props.push((name, spec));
        }
        self
    }

    /// Look up a property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropSpec> {
        self.props.iter().find(|(n, _)| *n == name).map(|(_, s)| s)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PropSpec)> {
        self.props.iter().map(|(n, s)| (*n, s))
    }

    /// Fill absent properties with their declared defaults.
    pub fn apply_defaults(&self, props: &mut Map<String, Value>) {
        for (name, spec) in self.iter() {
            if let Some(default) = &spec.default
                && !props.contains_key(name)
            {
                props.insert(name.to_owned(), default.clone());
            }
        }
    }

    /// Validate resolved properties against this schema.
    #[must_use]
    pub fn validate(&self, component: &str, props: &Map<String, Value>) -> Validation {
        let mut validation = Validation::default();

        for (name, spec) in self.iter() {
            if spec.required && !props.contains_key(name) {
                validation
                    .errors
                    .push(format!("Required prop '{name}' missing for component {component}"));
            }
        }

        for (name, value) in props {
            let Some(spec) = self.get(name) else {
                validation
                    .warnings
                    .push(format!("Unknown prop '{name}' for component {component}"));
                continue;
            };
            if !value.is_null() && !spec.prop_type.matches(value) {
                validation.warnings.push(format!(
                    "Prop '{name}' expected type {} but got {}",
                    spec.prop_type,
                    value_kind(value)
                ));
            }
        }

        validation.valid = validation.errors.is_empty();
        validation
    }
}

/// Outcome of property validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// No errors were found.
    pub valid: bool,
    /// Problems that make the call invalid.
    pub errors: Vec<String>,
    /// Non-fatal problems.
    pub warnings: Vec<String>,
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl Validation {
    /// Validation result for a name missing from the registry.
    #[must_use]
    pub fn not_found(component: &str) -> Self {
        Self {
            valid: false,
            errors: vec![format!("Component {component} not found in registry")],
            warnings: Vec::new(),
        }
    }

    /// Whether there is anything to report.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn avatar_schema() -> PropSchema {
        PropSchema::new()
            .prop("src", PropSpec::new(PropType::String, "Image").required())
            .prop(
                "size",
                PropSpec::new(PropType::String, "Size").with_default("medium"),
            )
            .prop("animated", PropSpec::new(PropType::Boolean, "Animate"))
    }

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_missing_required() {
        let validation = avatar_schema().validate("Avatar", &Map::new());

        assert_eq!(
            validation,
            Validation {
                valid: false,
                errors: vec!["Required prop 'src' missing for component Avatar".to_owned()],
                warnings: vec![],
            }
        );
    }

    #[test]
    fn test_unknown_prop_is_warning() {
        let validation =
            avatar_schema().validate("Avatar", &map(json!({"src": "a.png", "shape": "round"})));

        assert!(validation.valid);
        assert_eq!(
            validation.warnings,
            vec!["Unknown prop 'shape' for component Avatar"]
        );
    }

    #[test]
    fn test_type_mismatch_is_warning() {
        let validation =
            avatar_schema().validate("Avatar", &map(json!({"src": "a.png", "animated": "yes"})));

        assert!(validation.valid);
        assert_eq!(
            validation.warnings,
            vec!["Prop 'animated' expected type boolean but got string"]
        );
    }

    #[test]
    fn test_null_value_skips_type_check() {
        let validation =
            avatar_schema().validate("Avatar", &map(json!({"src": "a.png", "animated": null})));

        assert!(validation.is_clean());
    }

    #[test]
    fn test_apply_defaults() {
        let mut props = map(json!({"src": "a.png"}));
        avatar_schema().apply_defaults(&mut props);

        assert_eq!(props, map(json!({"src": "a.png", "size": "medium"})));
    }

    #[test]
    fn test_redeclare_replaces() {
        let schema = avatar_schema().prop("src", PropSpec::new(PropType::String, "Other"));

        assert!(!schema.get("src").unwrap().required);
        assert_eq!(schema.iter().count(), 3);
    }

    #[test]
    fn test_not_found() {
        let validation = Validation::not_found("Ghost");

        assert!(!validation.valid);
        assert_eq!(validation.errors, vec!["Component Ghost not found in registry"]);
    }
}
