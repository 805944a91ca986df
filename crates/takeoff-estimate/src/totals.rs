//! Category subtotals and grand totals.

use serde::Serialize;

use takeoff_core::model::Category;

use crate::preview::CostPreview;

/// Summed costs over a set of previews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostTotals {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub markup_amount: f64,
    /// Always `material_cost + labor_cost + markup_amount`.
    pub total_cost: f64,
}

impl CostTotals {
    /// Sum material, labor, and markup independently; derive the total.
    pub fn from_previews<'a>(previews: impl IntoIterator<Item = &'a CostPreview>) -> Self {
        let mut totals = Self::default();
        for p in previews {
            totals.material_cost += p.material_cost;
            totals.labor_cost += p.labor_cost;
            totals.markup_amount += p.markup_amount;
        }
        totals.derive_total()
    }

    /// Fold category subtotals into a grand total.
    pub fn from_subtotals(subtotals: &[CategorySubtotal]) -> Self {
        let mut totals = Self::default();
        for s in subtotals {
            totals.material_cost += s.totals.material_cost;
            totals.labor_cost += s.totals.labor_cost;
            totals.markup_amount += s.totals.markup_amount;
        }
        totals.derive_total()
    }

    pub fn base_cost(&self) -> f64 {
        self.material_cost + self.labor_cost
    }

    fn derive_total(mut self) -> Self {
        self.total_cost = self.material_cost + self.labor_cost + self.markup_amount;
        self
    }
}

/// Totals for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySubtotal {
    pub category_id: String,
    /// `None` for elements whose category is not in the category list.
    pub category_name: Option<String>,
    pub element_count: usize,
    #[serde(flatten)]
    pub totals: CostTotals,
}

/// Grand total over every preview.
pub fn compute_totals(previews: &[CostPreview]) -> CostTotals {
    CostTotals::from_previews(previews)
}

/// One subtotal per listed category, in input order, followed by one per
/// unlisted category id in order of first appearance.
///
/// Listed categories without elements still get a (zero) subtotal.
pub fn category_subtotals(
    categories: &[Category],
    previews: &[CostPreview],
) -> Vec<CategorySubtotal> {
    let mut out: Vec<CategorySubtotal> = Vec::with_capacity(categories.len());
    for c in categories {
        if out.iter().any(|s| s.category_id == c.id) {
            continue;
        }
        out.push(subtotal(&c.id, Some(c.name.clone()), previews));
    }
    for p in previews {
        if !out.iter().any(|s| s.category_id == p.category_id) {
            out.push(subtotal(&p.category_id, None, previews));
        }
    }
    out
}

fn subtotal(id: &str, name: Option<String>, previews: &[CostPreview]) -> CategorySubtotal {
    let members: Vec<&CostPreview> = previews.iter().filter(|p| p.category_id == id).collect();
    CategorySubtotal {
        category_id: id.to_string(),
        category_name: name,
        element_count: members.len(),
        totals: CostTotals::from_previews(members),
    }
}
