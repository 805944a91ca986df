//! Cost aggregation for takeoff proposals.
//!
//! Every element's material and labor formulas are evaluated against the
//! proposal parameters, a markup percentage is applied, and the resulting
//! [`CostPreview`]s are summed into category subtotals and grand totals.
//! Everything is recomputed from scratch on each call.

pub mod estimator;
pub mod money;
pub mod preview;
pub mod totals;

pub use estimator::{Estimate, Estimator};
pub use money::{format_currency, round_currency};
pub use preview::{
    CostField, CostPreview, ElementDiagnostics, compute_cost_previews,
    compute_cost_previews_with_diagnostics, effective_markup,
};
pub use totals::{CategorySubtotal, CostTotals, category_subtotals, compute_totals};
