//! Parameters, elements, categories, and the markup policy.
//!
//! Field names on the wire follow the proposal editor's payloads
//! (`useFormula`, `categoryId`, `useGlobalMarkup`), with snake_case aliases
//! accepted for hand-written snapshot files.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::enums::ParameterKind;
use crate::numeric::NumericInput;

/// A named numeric input referenced by formulas as `{name}` or `{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique identifier within the template or proposal.
    pub id: String,

    /// Human-readable label, also the primary formula token.
    pub name: String,

    /// Unit classification (informational).
    #[serde(default, rename = "type")]
    pub kind: ParameterKind,

    /// Literal value, used when `use_formula` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NumericInput>,

    /// Whether the value comes from `formula` instead of `value`.
    #[serde(default, rename = "useFormula", alias = "use_formula")]
    pub use_formula: bool,

    /// Formula text, resolved recursively against the same parameter set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Parameter {
    /// Returns `true` if this parameter's value is formula-derived.
    pub fn is_formula(&self) -> bool {
        self.use_formula
    }

    /// The literal value coerced to a number (`0.0` when absent or non-numeric).
    pub fn literal_value(&self) -> f64 {
        self.value.as_ref().map(NumericInput::to_number).unwrap_or(0.0)
    }
}

/// A billable line item with material and labor cost formulas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// The owning category (membership is by foreign key).
    #[serde(default, rename = "categoryId", alias = "category_id")]
    pub category_id: String,

    /// Material cost formula or literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_cost: Option<NumericInput>,

    /// Labor cost formula or literal. When `labor_rate` is set this is a
    /// labor quantity rather than a cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<NumericInput>,

    /// Optional labor rate multiplied into the evaluated labor quantity.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "laborRate")]
    pub labor_rate: Option<NumericInput>,

    /// Markup percentage, ignored when the global markup override is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<NumericInput>,
}

impl Element {
    /// Material cost as formula text (`None` when unset).
    pub fn material_formula(&self) -> Option<Cow<'_, str>> {
        self.material_cost.as_ref().map(NumericInput::as_formula)
    }

    /// Labor cost as formula text (`None` when unset).
    pub fn labor_formula(&self) -> Option<Cow<'_, str>> {
        self.labor_cost.as_ref().map(NumericInput::as_formula)
    }

    /// Labor rate as formula text. A blank rate counts as unset.
    pub fn labor_rate_formula(&self) -> Option<Cow<'_, str>> {
        self.labor_rate
            .as_ref()
            .filter(|r| !r.is_blank())
            .map(NumericInput::as_formula)
    }
}

/// A grouping of elements (also called a module or trade).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Proposal-level markup policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkupPolicy {
    /// When true every element uses `global_markup_percentage`.
    #[serde(default, rename = "useGlobalMarkup", alias = "use_global_markup")]
    pub use_global_markup: bool,

    /// Global markup percentage, also the fallback for elements without one.
    #[serde(
        default,
        rename = "globalMarkupPercentage",
        alias = "global_markup_percentage"
    )]
    pub global_markup_percentage: f64,
}

impl MarkupPolicy {
    /// A policy that forces `percentage` on every element.
    pub fn global(percentage: f64) -> Self {
        Self {
            use_global_markup: true,
            global_markup_percentage: percentage,
        }
    }

    /// A policy that honours each element's own markup, falling back to
    /// `default_percentage` when an element has none.
    pub fn per_element(default_percentage: f64) -> Self {
        Self {
            use_global_markup: false,
            global_markup_percentage: default_percentage,
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Builder for [`Parameter`].
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    parameter: Parameter,
}

impl ParameterBuilder {
    /// Creates a builder for a parameter whose id and name are both `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            parameter: Parameter {
                id: name.clone(),
                name,
                ..Parameter::default()
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.parameter.id = id.into();
        self
    }

    pub fn kind(mut self, kind: impl Into<ParameterKind>) -> Self {
        self.parameter.kind = kind.into();
        self
    }

    pub fn value(mut self, value: impl Into<NumericInput>) -> Self {
        self.parameter.value = Some(value.into());
        self.parameter.use_formula = false;
        self
    }

    /// Makes the parameter formula-valued.
    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.parameter.formula = Some(formula.into());
        self.parameter.use_formula = true;
        self
    }

    pub fn build(self) -> Parameter {
        self.parameter
    }
}

/// Builder for [`Element`].
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    element: Element,
}

impl ElementBuilder {
    /// Creates a builder for an element whose id and name are both `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            element: Element {
                id: name.clone(),
                name,
                ..Element::default()
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.element.id = id.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.element.description = description.into();
        self
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.element.category_id = category_id.into();
        self
    }

    pub fn material(mut self, material: impl Into<NumericInput>) -> Self {
        self.element.material_cost = Some(material.into());
        self
    }

    pub fn labor(mut self, labor: impl Into<NumericInput>) -> Self {
        self.element.labor_cost = Some(labor.into());
        self
    }

    pub fn labor_rate(mut self, rate: impl Into<NumericInput>) -> Self {
        self.element.labor_rate = Some(rate.into());
        self
    }

    pub fn markup(mut self, markup: impl Into<NumericInput>) -> Self {
        self.element.markup = Some(markup.into());
        self
    }

    pub fn build(self) -> Element {
        self.element
    }
}
