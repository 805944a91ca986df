//! Per-element cost previews.
//!
//! A [`CostPreview`] is derived, never stored: it carries the evaluated
//! costs of one element together with the formula text they came from.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use takeoff_core::model::{Category, Element, MarkupPolicy, Parameter};
use takeoff_formula::{Diagnostic, DiagnosticKind, Evaluation, Evaluator, FormulaError};

/// Evaluated cost breakdown of one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostPreview {
    pub element_id: String,
    pub element_name: String,
    pub category_id: String,

    /// Material cost formula as entered (empty when unset).
    pub material_formula: String,
    /// Labor cost (or labor quantity) formula as entered.
    pub labor_formula: String,

    pub material_cost: f64,
    /// Labor cost, already multiplied by the labor rate when there is one.
    pub labor_cost: f64,
    /// Evaluated labor rate, for elements that separate rate from quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_rate: Option<f64>,

    pub base_cost: f64,
    pub markup_percentage: f64,
    pub markup_amount: f64,
    pub total_cost: f64,
}

/// Which input of an element a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostField {
    Material,
    Labor,
    LaborRate,
    Markup,
}

impl CostField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Labor => "labor",
            Self::LaborRate => "labor rate",
            Self::Markup => "markup",
        }
    }
}

impl fmt::Display for CostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problems met while computing one field of one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementDiagnostics {
    pub element_id: String,
    pub element_name: String,
    pub field: CostField,

    /// Set when the whole formula was replaced by `0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FormulaError>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ElementDiagnostics {
    /// Returns `true` if some part of this field was forced to `0`.
    pub fn has_errors(&self) -> bool {
        self.fallback.is_some() || self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// The markup percentage that applies to `element` under `policy`.
///
/// A global override wins; otherwise the element's own markup is coerced
/// with the numeric rule (so `""` is `0`), and an element without a markup
/// uses the global percentage.
pub fn effective_markup(element: &Element, policy: MarkupPolicy) -> f64 {
    if policy.use_global_markup {
        return policy.global_markup_percentage;
    }
    element
        .markup
        .as_ref()
        .map_or(policy.global_markup_percentage, |m| m.to_number())
}

/// Compute a cost preview for every element.
///
/// Previews come out grouped by category, categories in input order and
/// elements in input order within each; elements whose category is not
/// listed follow at the end in input order. Bad formulas cost `0`.
pub fn compute_cost_previews(
    categories: &[Category],
    elements: &[Element],
    parameters: &[Parameter],
    policy: MarkupPolicy,
) -> Vec<CostPreview> {
    compute_cost_previews_with_diagnostics(categories, elements, parameters, policy).0
}

/// Like [`compute_cost_previews`], also reporting which elements fell back
/// to `0` or produced warnings.
pub fn compute_cost_previews_with_diagnostics(
    categories: &[Category],
    elements: &[Element],
    parameters: &[Parameter],
    policy: MarkupPolicy,
) -> (Vec<CostPreview>, Vec<ElementDiagnostics>) {
    previews_with(&Evaluator::new(parameters), categories, elements, policy)
}

pub(crate) fn previews_with(
    evaluator: &Evaluator<'_>,
    categories: &[Category],
    elements: &[Element],
    policy: MarkupPolicy,
) -> (Vec<CostPreview>, Vec<ElementDiagnostics>) {
    let mut diagnostics = Vec::new();
    let previews = ordered(categories, elements)
        .into_iter()
        .map(|element| preview_element(evaluator, element, policy, &mut diagnostics))
        .collect();
    (previews, diagnostics)
}

/// Elements in preview order.
fn ordered<'a>(categories: &[Category], elements: &'a [Element]) -> Vec<&'a Element> {
    let mut listed: HashSet<&str> = HashSet::with_capacity(categories.len());
    let mut out = Vec::with_capacity(elements.len());
    for category in categories {
        if !listed.insert(category.id.as_str()) {
            continue;
        }
        out.extend(elements.iter().filter(|e| e.category_id == category.id));
    }
    out.extend(
        elements
            .iter()
            .filter(|e| !listed.contains(e.category_id.as_str())),
    );
    out
}

fn preview_element(
    evaluator: &Evaluator<'_>,
    element: &Element,
    policy: MarkupPolicy,
    sink: &mut Vec<ElementDiagnostics>,
) -> CostPreview {
    let material_formula = element.material_formula();
    let labor_formula = element.labor_formula();

    let material_cost = field_cost(
        evaluator,
        element,
        CostField::Material,
        material_formula.as_deref(),
        sink,
    );
    let labor_quantity = field_cost(
        evaluator,
        element,
        CostField::Labor,
        labor_formula.as_deref(),
        sink,
    );

    let labor_rate = element
        .labor_rate_formula()
        .map(|f| field_cost(evaluator, element, CostField::LaborRate, Some(&f), sink));
    let labor_cost = labor_rate.map_or(labor_quantity, |rate| labor_quantity * rate);

    let markup_percentage = effective_markup(element, policy);
    if !policy.use_global_markup {
        if let Some(ref raw) = element.markup {
            if raw.is_non_numeric() {
                sink.push(ElementDiagnostics {
                    element_id: element.id.clone(),
                    element_name: element.name.clone(),
                    field: CostField::Markup,
                    fallback: None,
                    diagnostics: vec![Diagnostic {
                        parameter: None,
                        kind: DiagnosticKind::NonNumericValue {
                            token: "markup".to_string(),
                            raw: raw.to_string(),
                        },
                    }],
                });
            }
        }
    }

    let base_cost = material_cost + labor_cost;
    let markup_amount = base_cost * markup_percentage / 100.0;

    CostPreview {
        element_id: element.id.clone(),
        element_name: element.name.clone(),
        category_id: element.category_id.clone(),
        material_formula: material_formula.map(Cow::into_owned).unwrap_or_default(),
        labor_formula: labor_formula.map(Cow::into_owned).unwrap_or_default(),
        material_cost,
        labor_cost,
        labor_rate,
        base_cost,
        markup_percentage,
        markup_amount,
        total_cost: base_cost + markup_amount,
    }
}

fn field_cost(
    evaluator: &Evaluator<'_>,
    element: &Element,
    field: CostField,
    formula: Option<&str>,
    sink: &mut Vec<ElementDiagnostics>,
) -> f64 {
    let Evaluation {
        value,
        fallback,
        diagnostics,
    } = evaluator.evaluate_detailed(formula);
    if fallback.is_some() || !diagnostics.is_empty() {
        sink.push(ElementDiagnostics {
            element_id: element.id.clone(),
            element_name: element.name.clone(),
            field,
            fallback,
            diagnostics,
        });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use takeoff_core::model::{ElementBuilder, ParameterBuilder};

    fn framing() -> (Vec<Category>, Vec<Element>, Vec<Parameter>) {
        let categories = vec![Category {
            id: "framing".into(),
            name: "Framing".into(),
        }];
        let elements = vec![
            ElementBuilder::new("Wall Framing")
                .id("e1")
                .category("framing")
                .material("{Wall Length} * {Wall Height} * 4.5")
                .labor("{Wall Length} * 35")
                .markup(15.0)
                .build(),
        ];
        let parameters = vec![
            ParameterBuilder::new("Wall Length").value(20.0).build(),
            ParameterBuilder::new("Wall Height").value(8.0).build(),
        ];
        (categories, elements, parameters)
    }

    #[test]
    fn end_to_end_wall_framing() {
        let (categories, elements, parameters) = framing();
        let previews = compute_cost_previews(
            &categories,
            &elements,
            &parameters,
            MarkupPolicy::per_element(0.0),
        );
        assert_eq!(previews.len(), 1);
        let p = &previews[0];
        assert_eq!(p.material_cost, 720.0);
        assert_eq!(p.labor_cost, 700.0);
        assert_eq!(p.base_cost, 1420.0);
        assert_eq!(p.markup_percentage, 15.0);
        assert_eq!(p.markup_amount, 213.0);
        assert_eq!(p.total_cost, 1633.0);
        assert_eq!(p.material_formula, "{Wall Length} * {Wall Height} * 4.5");
        assert_eq!(p.labor_formula, "{Wall Length} * 35");
        assert_eq!(p.labor_rate, None);
    }

    #[test]
    fn global_markup_overrides_element_markup() {
        let (categories, mut elements, parameters) = framing();
        elements.push(
            ElementBuilder::new("Blocking")
                .category("framing")
                .material("100")
                .markup(5.0)
                .build(),
        );
        elements.push(ElementBuilder::new("Headers").category("framing").material("50").build());

        let previews = compute_cost_previews(
            &categories,
            &elements,
            &parameters,
            MarkupPolicy::global(20.0),
        );
        assert!(previews.iter().all(|p| p.markup_percentage == 20.0));

        let previews = compute_cost_previews(
            &categories,
            &elements,
            &parameters,
            MarkupPolicy::per_element(10.0),
        );
        let pcts: Vec<f64> = previews.iter().map(|p| p.markup_percentage).collect();
        assert_eq!(pcts, vec![15.0, 5.0, 10.0]);
    }

    #[test]
    fn effective_markup_coercion() {
        let policy = MarkupPolicy::per_element(12.0);
        let e = |m: Option<&str>| {
            let mut b = ElementBuilder::new("E");
            if let Some(m) = m {
                b = b.markup(m);
            }
            b.build()
        };
        assert_eq!(effective_markup(&e(None), policy), 12.0);
        assert_eq!(effective_markup(&e(Some("")), policy), 0.0);
        assert_eq!(effective_markup(&e(Some("7.5%")), policy), 7.5);
        assert_eq!(effective_markup(&e(Some("n/a")), policy), 0.0);
        assert_eq!(effective_markup(&e(Some("7.5")), MarkupPolicy::global(3.0)), 3.0);
    }

    #[test]
    fn preview_order_follows_categories_then_unlisted() {
        let categories = vec![
            Category { id: "b".into(), name: "B".into() },
            Category { id: "a".into(), name: "A".into() },
        ];
        let elements = vec![
            ElementBuilder::new("a1").id("a1").category("a").build(),
            ElementBuilder::new("x1").id("x1").category("x").build(),
            ElementBuilder::new("b1").id("b1").category("b").build(),
            ElementBuilder::new("a2").id("a2").category("a").build(),
            ElementBuilder::new("n1").id("n1").build(),
        ];
        let ids: Vec<String> = compute_cost_previews(
            &categories,
            &elements,
            &[],
            MarkupPolicy::default(),
        )
        .into_iter()
        .map(|p| p.element_id)
        .collect();
        assert_eq!(ids, vec!["b1", "a1", "a2", "x1", "n1"]);
    }

    #[test]
    fn labor_rate_multiplies_quantity() {
        let parameters = vec![ParameterBuilder::new("Hours").value(12.0).build()];
        let elements = vec![
            ElementBuilder::new("Install")
                .labor("{Hours}")
                .labor_rate("65")
                .markup(10.0)
                .build(),
        ];
        let previews =
            compute_cost_previews(&[], &elements, &parameters, MarkupPolicy::default());
        let p = &previews[0];
        assert_eq!(p.labor_rate, Some(65.0));
        assert_eq!(p.labor_cost, 780.0);
        assert_eq!(p.base_cost, 780.0);
        assert_eq!(p.total_cost, 858.0);
    }

    #[test]
    fn blank_labor_rate_is_ignored() {
        let elements = vec![ElementBuilder::new("E").labor("40").labor_rate("  ").build()];
        let p = &compute_cost_previews(&[], &elements, &[], MarkupPolicy::default())[0];
        assert_eq!(p.labor_rate, None);
        assert_eq!(p.labor_cost, 40.0);
    }

    #[test]
    fn bad_formula_does_not_block_other_elements() {
        let elements = vec![
            ElementBuilder::new("Broken").id("bad").material("(1 +").build(),
            ElementBuilder::new("Fine").id("ok").material("100").markup(10.0).build(),
        ];
        let (previews, diagnostics) =
            compute_cost_previews_with_diagnostics(&[], &elements, &[], MarkupPolicy::default());
        assert_eq!(previews[0].material_cost, 0.0);
        assert_eq!(previews[0].total_cost, 0.0);
        assert_eq!(previews[1].total_cost, 110.0);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].element_id, "bad");
        assert_eq!(diagnostics[0].field, CostField::Material);
        assert!(diagnostics[0].has_errors());
    }

    #[test]
    fn diagnostics_name_field_and_reference() {
        let elements = vec![
            ElementBuilder::new("Trim")
                .id("t")
                .material("{Perimeter} * 3")
                .labor("10")
                .markup("lots")
                .build(),
        ];
        let (_, diagnostics) =
            compute_cost_previews_with_diagnostics(&[], &elements, &[], MarkupPolicy::default());
        let fields: Vec<CostField> = diagnostics.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec![CostField::Material, CostField::Markup]);
        assert_eq!(
            diagnostics[0].diagnostics[0].kind,
            DiagnosticKind::MissingReference {
                token: "Perimeter".into()
            }
        );
        assert!(diagnostics[0].has_errors());
        assert!(!diagnostics[1].has_errors());
    }

    #[test]
    fn clean_inputs_have_no_diagnostics() {
        let (categories, elements, parameters) = framing();
        let (_, diagnostics) = compute_cost_previews_with_diagnostics(
            &categories,
            &elements,
            &parameters,
            MarkupPolicy::default(),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn recompute_is_idempotent() {
        let (categories, elements, parameters) = framing();
        let policy = MarkupPolicy::per_element(5.0);
        let first = compute_cost_previews(&categories, &elements, &parameters, policy);
        let second = compute_cost_previews(&categories, &elements, &parameters, policy);
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.total_cost.to_bits(), b.total_cost.to_bits());
        }
    }

    #[test]
    fn numeric_cost_fields_are_formulas_too() {
        let elements = vec![
            ElementBuilder::new("E")
                .material(250.0)
                .labor(-50.0)
                .build(),
        ];
        let p = &compute_cost_previews(&[], &elements, &[], MarkupPolicy::default())[0];
        assert_eq!(p.material_formula, "250");
        assert_eq!(p.base_cost, 200.0);
    }
}
