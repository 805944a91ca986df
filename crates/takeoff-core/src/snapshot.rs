//! Snapshot files: the plain input handed to a recompute.
//!
//! A snapshot bundles parameters, categories, elements, and an optional
//! markup policy. It can be written as JSON, YAML, or TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Category, Element, MarkupPolicy, Parameter};

/// Everything a cost recompute needs, captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub elements: Vec<Element>,

    /// Markup policy; callers supply a default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<MarkupPolicy>,
}

impl Snapshot {
    /// Looks up a category by id.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// The snapshot's markup policy, or `fallback` if it has none.
    pub fn markup_or(&self, fallback: MarkupPolicy) -> MarkupPolicy {
        self.markup.unwrap_or(fallback)
    }
}

/// Errors that can occur while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a snapshot from a JSON string.
pub fn parse_json(content: &str) -> Result<Snapshot, SnapshotError> {
    serde_json::from_str(content).map_err(|e| SnapshotError::Parse(e.to_string()))
}

/// Parse a snapshot from a YAML string.
pub fn parse_yaml(content: &str) -> Result<Snapshot, SnapshotError> {
    serde_yaml::from_str(content).map_err(|e| SnapshotError::Parse(e.to_string()))
}

/// Parse a snapshot from a TOML string.
pub fn parse_toml(content: &str) -> Result<Snapshot, SnapshotError> {
    toml::from_str(content).map_err(|e| SnapshotError::Parse(e.to_string()))
}

/// Load a snapshot from a file (format chosen by extension).
pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&content),
        Some("yaml") | Some("yml") => parse_yaml(&content),
        Some("toml") => parse_toml(&content),
        _ => {
            // Try JSON first, then YAML, then TOML
            parse_json(&content)
                .or_else(|_| parse_yaml(&content))
                .or_else(|_| parse_toml(&content))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::NumericInput;
    use pretty_assertions::assert_eq;

    const FRAMING_JSON: &str = r#"{
        "parameters": [
            {"id": "wl", "name": "Wall Length", "type": "Linear Feet", "value": 20},
            {"id": "wh", "name": "Wall Height", "type": "Linear Feet", "value": "8"}
        ],
        "categories": [{"id": "framing", "name": "Framing"}],
        "elements": [{
            "id": "e1",
            "name": "Wall Framing",
            "categoryId": "framing",
            "material_cost": "{Wall Length} * {Wall Height} * 4.5",
            "labor_cost": "{Wall Length} * 35",
            "markup": 15
        }]
    }"#;

    #[test]
    fn parse_json_snapshot() {
        let s = parse_json(FRAMING_JSON).unwrap();
        assert_eq!(s.parameters.len(), 2);
        assert_eq!(s.parameters[1].value, Some(NumericInput::Text("8".into())));
        assert_eq!(s.elements[0].category_id, "framing");
        assert!(s.markup.is_none());
        assert_eq!(s.category("framing").map(|c| c.name.as_str()), Some("Framing"));
    }

    #[test]
    fn parse_yaml_snapshot() {
        let yaml = r#"
parameters:
  - id: a
    name: A
    value: 2
  - id: b
    name: B
    useFormula: true
    formula: "{A} * 3"
categories:
  - id: c
    name: Concrete
elements: []
markup:
  useGlobalMarkup: true
  globalMarkupPercentage: 20
"#;
        let s = parse_yaml(yaml).unwrap();
        assert!(s.parameters[1].use_formula);
        assert_eq!(s.markup, Some(MarkupPolicy::global(20.0)));
    }

    #[test]
    fn parse_toml_snapshot() {
        let toml_str = r#"
[[parameters]]
id = "a"
name = "A"
value = 5

[[categories]]
id = "site"
name = "Sitework"

[[elements]]
id = "grading"
name = "Grading"
category_id = "site"
material_cost = "{A} * 10"
markup = "12.5"
"#;
        let s = parse_toml(toml_str).unwrap();
        assert_eq!(s.elements[0].category_id, "site");
        assert_eq!(s.elements[0].markup, Some(NumericInput::Text("12.5".into())));
    }

    #[test]
    fn load_by_extension_and_fallback() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("proposal.json");
        std::fs::write(&json_path, FRAMING_JSON).unwrap();
        assert_eq!(load_snapshot(&json_path).unwrap().elements.len(), 1);

        let bare = dir.path().join("proposal");
        std::fs::write(&bare, "parameters:\n  - {id: x, name: X, value: 1}\n").unwrap();
        assert_eq!(load_snapshot(&bare).unwrap().parameters[0].name, "X");
    }

    #[test]
    fn parse_error_is_reported() {
        let err = parse_json("{not json").unwrap_err();
        assert!(err.to_string().starts_with("parse error"));
    }

    #[test]
    fn markup_fallback() {
        let s = Snapshot::default();
        assert_eq!(s.markup_or(MarkupPolicy::per_element(10.0)).global_markup_percentage, 10.0);
    }
}
