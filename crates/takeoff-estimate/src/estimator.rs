//! One-shot recompute of a whole snapshot.

use serde::Serialize;
use tracing::{debug, warn};

use takeoff_core::model::MarkupPolicy;
use takeoff_core::snapshot::Snapshot;
use takeoff_formula::{Evaluator, Limits, TokenMatch};

use crate::preview::{CostPreview, ElementDiagnostics, previews_with};
use crate::totals::{CategorySubtotal, CostTotals, category_subtotals, compute_totals};

/// Everything derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// The markup policy that was applied.
    pub policy: MarkupPolicy,
    pub previews: Vec<CostPreview>,
    pub categories: Vec<CategorySubtotal>,
    pub totals: CostTotals,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ElementDiagnostics>,
}

impl Estimate {
    /// Returns `true` if any element had a cost forced to `0`.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(ElementDiagnostics::has_errors)
    }
}

/// Settings for recomputing snapshots.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    limits: Limits,
    token_match: TokenMatch,
    default_markup: f64,
    policy_override: Option<MarkupPolicy>,
}

impl Estimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_token_match(mut self, token_match: TokenMatch) -> Self {
        self.token_match = token_match;
        self
    }

    /// Markup percentage for snapshots that carry no markup policy.
    pub fn with_default_markup(mut self, percentage: f64) -> Self {
        self.default_markup = percentage;
        self
    }

    /// Ignore the snapshot's markup policy and use `policy` instead.
    pub fn with_policy(mut self, policy: MarkupPolicy) -> Self {
        self.policy_override = Some(policy);
        self
    }

    /// The policy that applies to `snapshot`.
    pub fn policy_for(&self, snapshot: &Snapshot) -> MarkupPolicy {
        self.policy_override
            .unwrap_or_else(|| snapshot.markup_or(MarkupPolicy::per_element(self.default_markup)))
    }

    /// An evaluator over `snapshot`'s parameters with these settings.
    pub fn evaluator<'a>(&self, snapshot: &'a Snapshot) -> Evaluator<'a> {
        Evaluator::new(&snapshot.parameters)
            .with_limits(self.limits)
            .with_token_match(self.token_match)
    }

    /// Recompute previews, subtotals, and totals from scratch.
    pub fn estimate(&self, snapshot: &Snapshot) -> Estimate {
        let policy = self.policy_for(snapshot);
        debug!(
            parameters = snapshot.parameters.len(),
            elements = snapshot.elements.len(),
            global = policy.use_global_markup,
            "recomputing estimate"
        );

        let evaluator = self.evaluator(snapshot);
        let (previews, diagnostics) =
            previews_with(&evaluator, &snapshot.categories, &snapshot.elements, policy);
        for d in diagnostics.iter().filter(|d| d.fallback.is_some()) {
            warn!(
                element = %d.element_id,
                field = %d.field,
                "cost formula could not be evaluated, using 0"
            );
        }

        let categories = category_subtotals(&snapshot.categories, &previews);
        let totals = compute_totals(&previews);
        debug!(total = totals.total_cost, "estimate complete");

        Estimate {
            policy,
            previews,
            categories,
            totals,
            diagnostics,
        }
    }
}
