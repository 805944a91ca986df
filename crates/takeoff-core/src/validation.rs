//! Snapshot validation rules.
//!
//! These checks reject malformed input shapes before any formula runs.
//! Formula problems (missing references, bad arithmetic, cycles) are not
//! validation errors: the evaluator turns those into zeros and diagnostics.

use std::collections::HashSet;

use crate::snapshot::Snapshot;

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("parameter id is required (parameter '{0}')")]
    ParameterIdRequired(String),

    #[error("parameter name is required (parameter id '{0}')")]
    ParameterNameRequired(String),

    #[error("duplicate parameter id: {0}")]
    DuplicateParameterId(String),

    #[error("duplicate parameter name: {0} (formula references would be ambiguous)")]
    DuplicateParameterName(String),

    #[error("duplicate category id: {0}")]
    DuplicateCategoryId(String),

    #[error("duplicate element id: {0}")]
    DuplicateElementId(String),

    #[error("element '{element}' references unknown category '{category}'")]
    UnknownCategory { element: String, category: String },

    #[error("global markup percentage must be a finite, non-negative number (got {0})")]
    InvalidGlobalMarkup(f64),
}

/// Validates a snapshot, returning the first rule it breaks.
pub fn validate_snapshot(snapshot: &Snapshot) -> Result<(), ValidationError> {
    validate_parameters(snapshot)?;

    let mut category_ids = HashSet::new();
    for category in &snapshot.categories {
        if !category_ids.insert(category.id.as_str()) {
            return Err(ValidationError::DuplicateCategoryId(category.id.clone()));
        }
    }

    let mut element_ids = HashSet::new();
    for element in &snapshot.elements {
        if !element_ids.insert(element.id.as_str()) {
            return Err(ValidationError::DuplicateElementId(element.id.clone()));
        }
        // An empty category id means "uncategorized".
        if !element.category_id.is_empty()
            && !category_ids.contains(element.category_id.as_str())
        {
            return Err(ValidationError::UnknownCategory {
                element: element.id.clone(),
                category: element.category_id.clone(),
            });
        }
    }

    if let Some(policy) = snapshot.markup {
        let pct = policy.global_markup_percentage;
        if !pct.is_finite() || pct < 0.0 {
            return Err(ValidationError::InvalidGlobalMarkup(pct));
        }
    }

    Ok(())
}

/// Validates only the parameter list (ids and names present and unique).
pub fn validate_parameters(snapshot: &Snapshot) -> Result<(), ValidationError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for param in &snapshot.parameters {
        let id = param.id.trim();
        let name = param.name.trim();
        if id.is_empty() {
            return Err(ValidationError::ParameterIdRequired(param.name.clone()));
        }
        if name.is_empty() {
            return Err(ValidationError::ParameterNameRequired(param.id.clone()));
        }
        if !ids.insert(id) {
            return Err(ValidationError::DuplicateParameterId(param.id.clone()));
        }
        if !names.insert(name) {
            return Err(ValidationError::DuplicateParameterName(param.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ElementBuilder, MarkupPolicy, ParameterBuilder};

    fn base() -> Snapshot {
        Snapshot {
            parameters: vec![
                ParameterBuilder::new("Wall Length").id("wl").value(20.0).build(),
                ParameterBuilder::new("Wall Height").id("wh").value(8.0).build(),
            ],
            categories: vec![Category {
                id: "framing".into(),
                name: "Framing".into(),
            }],
            elements: vec![ElementBuilder::new("Wall Framing").category("framing").build()],
            markup: None,
        }
    }

    #[test]
    fn valid_snapshot_passes() {
        assert!(validate_snapshot(&base()).is_ok());
    }

    #[test]
    fn duplicate_parameter_name_fails() {
        let mut s = base();
        s.parameters[1].name = "Wall Length".into();
        match validate_snapshot(&s) {
            Err(ValidationError::DuplicateParameterName(n)) => assert_eq!(n, "Wall Length"),
            other => panic!("expected DuplicateParameterName, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_parameter_id_fails() {
        let mut s = base();
        s.parameters[1].id = "wl".into();
        assert!(matches!(
            validate_snapshot(&s),
            Err(ValidationError::DuplicateParameterId(_))
        ));
    }

    #[test]
    fn empty_parameter_fields_fail() {
        let mut s = base();
        s.parameters[0].id = " ".into();
        assert!(matches!(
            validate_snapshot(&s),
            Err(ValidationError::ParameterIdRequired(_))
        ));

        let mut s = base();
        s.parameters[0].name = String::new();
        assert!(matches!(
            validate_snapshot(&s),
            Err(ValidationError::ParameterNameRequired(_))
        ));
    }

    #[test]
    fn unknown_category_fails() {
        let mut s = base();
        s.elements[0].category_id = "roofing".into();
        let err = validate_snapshot(&s).unwrap_err();
        assert_eq!(
            err.to_string(),
            "element 'Wall Framing' references unknown category 'roofing'"
        );
    }

    #[test]
    fn uncategorized_element_passes() {
        let mut s = base();
        s.elements.push(ElementBuilder::new("Permit").build());
        assert!(validate_snapshot(&s).is_ok());
    }

    #[test]
    fn duplicate_element_and_category_fail() {
        let mut s = base();
        s.elements.push(s.elements[0].clone());
        assert!(matches!(
            validate_snapshot(&s),
            Err(ValidationError::DuplicateElementId(_))
        ));

        let mut s = base();
        s.categories.push(s.categories[0].clone());
        assert!(matches!(
            validate_snapshot(&s),
            Err(ValidationError::DuplicateCategoryId(_))
        ));
    }

    #[test]
    fn negative_global_markup_fails() {
        let mut s = base();
        s.markup = Some(MarkupPolicy::global(-5.0));
        assert!(matches!(
            validate_snapshot(&s),
            Err(ValidationError::InvalidGlobalMarkup(_))
        ));
    }
}
