//! Formula evaluation: reference resolution, substitution, and arithmetic.
//!
//! An [`Evaluator`] borrows an immutable parameter slice and evaluates any
//! number of formulas against it. Each call starts from scratch; the only
//! state shared between references is a per-call memo of formula parameters
//! already resolved and the stack of parameters currently being resolved.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use takeoff_core::enums::ParameterKind;
use takeoff_core::model::Parameter;
use takeoff_core::numeric::parse_strict_number;

use crate::parser::{evaluate_arithmetic, sanitize};
use crate::refs;
use crate::types::{Diagnostic, DiagnosticKind, Evaluation, FormulaError, Limits, TokenMatch};

/// Evaluate a formula against a parameter set with default limits.
///
/// Never fails: missing references, malformed arithmetic, cycles, and
/// non-finite results all come out as `0` for the affected part.
pub fn evaluate(formula: Option<&str>, parameters: &[Parameter]) -> f64 {
    Evaluator::new(parameters).evaluate(formula)
}

/// A parameter together with its resolved value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParameter {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

/// Evaluates formulas against one immutable parameter snapshot.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    parameters: &'a [Parameter],
    by_name: HashMap<&'a str, usize>,
    by_id: HashMap<&'a str, usize>,
    limits: Limits,
    token_match: TokenMatch,
}

/// Per-call resolution state.
///
/// `memo` holds values that resolved fully. A value whose resolution was cut
/// by the depth limit depends on how deep it started, so it goes into
/// `cut_memo` keyed by that depth instead.
#[derive(Default)]
struct Walk {
    stack: Vec<usize>,
    memo: HashMap<usize, f64>,
    cut_memo: HashMap<(usize, usize), f64>,
    depth_cuts: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Walk {
    fn report(&mut self, parameter: Option<&str>, kind: DiagnosticKind) {
        debug!(parameter, ?kind, "formula diagnostic");
        self.diagnostics.push(Diagnostic {
            parameter: parameter.map(str::to_owned),
            kind,
        });
    }
}

impl<'a> Evaluator<'a> {
    /// Index `parameters` by name and id. When two parameters share a name
    /// or id the first one wins.
    pub fn new(parameters: &'a [Parameter]) -> Self {
        let mut by_name = HashMap::with_capacity(parameters.len());
        let mut by_id = HashMap::with_capacity(parameters.len());
        for (i, p) in parameters.iter().enumerate() {
            by_name.entry(p.name.trim()).or_insert(i);
            by_id.entry(p.id.trim()).or_insert(i);
        }
        Self {
            parameters,
            by_name,
            by_id,
            limits: Limits::default(),
            token_match: TokenMatch::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_token_match(mut self, token_match: TokenMatch) -> Self {
        self.token_match = token_match;
        self
    }

    pub fn parameters(&self) -> &'a [Parameter] {
        self.parameters
    }

    /// Evaluate a formula to a number, `0` on failure.
    pub fn evaluate(&self, formula: Option<&str>) -> f64 {
        self.evaluate_detailed(formula).value
    }

    /// Evaluate a formula and report everything that went wrong on the way.
    pub fn evaluate_detailed(&self, formula: Option<&str>) -> Evaluation {
        let mut walk = Walk::default();
        let result = self.run(formula, None, &mut walk);
        finish(result, walk)
    }

    /// Resolve one parameter's value.
    ///
    /// Literal parameters coerce their value; formula parameters evaluate
    /// their formula with themselves on the resolution stack, so a formula
    /// that refers back to its own parameter is reported as a cycle.
    pub fn resolve_parameter(&self, parameter: &Parameter) -> Evaluation {
        let mut walk = Walk::default();
        if !parameter.is_formula() {
            let value = self.literal(parameter, &parameter.name, None, &mut walk);
            return Evaluation::ok(value, walk.diagnostics);
        }
        if let Some(&idx) = self.by_id.get(parameter.id.trim()) {
            walk.stack.push(idx);
        }
        let result = self.run(parameter.formula.as_deref(), Some(&parameter.name), &mut walk);
        finish(result, walk)
    }

    /// Resolve every parameter, in input order.
    pub fn resolve_all(&self) -> Vec<ResolvedParameter> {
        self.parameters
            .iter()
            .map(|p| ResolvedParameter {
                id: p.id.clone(),
                name: p.name.clone(),
                kind: p.kind.clone(),
                formula: p.is_formula().then(|| p.formula.clone().unwrap_or_default()),
                evaluation: self.resolve_parameter(p),
            })
            .collect()
    }

    /// Index of the parameter a token refers to under the current match
    /// mode. Tokens are trimmed; names win over ids in name mode.
    pub(crate) fn lookup_index(&self, token: &str) -> Option<usize> {
        let token = token.trim();
        match self.token_match {
            TokenMatch::Name => self
                .by_name
                .get(token)
                .or_else(|| self.by_id.get(token))
                .copied(),
            TokenMatch::Id => self.by_id.get(token).copied(),
        }
    }

    // -----------------------------------------------------------------------
    // Internal evaluation
    // -----------------------------------------------------------------------

    /// Evaluate `formula`. `context` names the parameter that owns it.
    fn run(
        &self,
        formula: Option<&str>,
        context: Option<&str>,
        walk: &mut Walk,
    ) -> Result<f64, FormulaError> {
        let Some(formula) = formula else {
            return Ok(0.0);
        };
        let trimmed = formula.trim();
        if trimmed.is_empty() {
            return Ok(0.0);
        }

        let length = trimmed.chars().count();
        if length > self.limits.max_length {
            return Err(FormulaError::TooLong {
                length,
                limit: self.limits.max_length,
            });
        }

        // Most formulas are plain numbers.
        if let Some(n) = parse_strict_number(trimmed) {
            return Ok(n);
        }

        let substituted = self.substitute(trimmed, context, walk);
        let (expr, dropped) = sanitize(&substituted);
        if !dropped.is_empty() {
            walk.report(
                context,
                DiagnosticKind::StrippedCharacters {
                    characters: dropped,
                },
            );
        }

        let value = evaluate_arithmetic(&expr, self.limits.max_nesting)?;
        if !value.is_finite() {
            return Err(FormulaError::NonFinite);
        }
        trace!(formula = trimmed, expr = %expr, value, "evaluated");
        Ok(value)
    }

    /// Replace every `{token}` with its resolved value.
    fn substitute(&self, formula: &str, context: Option<&str>, walk: &mut Walk) -> String {
        let mut out = String::with_capacity(formula.len());
        let mut last = 0;
        for r in refs::scan(formula) {
            out.push_str(&formula[last..r.start]);
            let value = self.resolve_reference(r.token, context, walk);
            push_number(&mut out, value);
            last = r.end;
        }
        out.push_str(&formula[last..]);
        out
    }

    fn resolve_reference(&self, token: &str, context: Option<&str>, walk: &mut Walk) -> f64 {
        let Some(idx) = self.lookup_index(token) else {
            walk.report(
                context,
                DiagnosticKind::MissingReference {
                    token: token.to_string(),
                },
            );
            return 0.0;
        };

        let param = &self.parameters[idx];
        if !param.is_formula() {
            return self.literal(param, token, context, walk);
        }

        if let Some(&value) = walk.memo.get(&idx) {
            return value;
        }
        let depth = walk.stack.len();
        if let Some(&value) = walk.cut_memo.get(&(idx, depth)) {
            return value;
        }

        if let Some(pos) = walk.stack.iter().position(|&i| i == idx) {
            let mut chain: Vec<String> = walk.stack[pos..]
                .iter()
                .map(|&i| self.parameters[i].name.clone())
                .collect();
            chain.push(param.name.clone());
            walk.report(context, DiagnosticKind::CyclicReference { chain });
            return 0.0;
        }

        if depth >= self.limits.max_depth {
            walk.depth_cuts += 1;
            walk.report(
                context,
                DiagnosticKind::DepthExceeded {
                    token: token.to_string(),
                    limit: self.limits.max_depth,
                },
            );
            return 0.0;
        }

        let cuts_before = walk.depth_cuts;
        walk.stack.push(idx);
        let value = match self.run(param.formula.as_deref(), Some(&param.name), walk) {
            Ok(v) => v,
            Err(error) => {
                walk.report(Some(&param.name), DiagnosticKind::FormulaFailed { error });
                0.0
            }
        };
        walk.stack.pop();
        if walk.depth_cuts == cuts_before {
            walk.memo.insert(idx, value);
        } else {
            walk.cut_memo.insert((idx, depth), value);
        }
        trace!(token, value, "resolved formula parameter");
        value
    }

    fn literal(
        &self,
        param: &Parameter,
        token: &str,
        context: Option<&str>,
        walk: &mut Walk,
    ) -> f64 {
        if let Some(ref raw) = param.value {
            if raw.is_non_numeric() {
                walk.report(
                    context,
                    DiagnosticKind::NonNumericValue {
                        token: token.to_string(),
                        raw: raw.to_string(),
                    },
                );
            }
        }
        param.literal_value()
    }
}

fn finish(result: Result<f64, FormulaError>, walk: Walk) -> Evaluation {
    match result {
        Ok(value) => Evaluation::ok(value, walk.diagnostics),
        Err(error) => {
            debug!(%error, "formula fell back to 0");
            Evaluation::failed(error, walk.diagnostics)
        }
    }
}

/// Append a resolved value as decimal text. Negative values are wrapped in
/// parentheses so they never fuse with a preceding operator.
///
/// Substitution is textual, so a token written right after a digit joins
/// it: `2{A}` reads as `25` when `A` is 5. A negative value cannot join a
/// number, and `2(-5)` is malformed, so the whole formula falls back to 0.
/// Write `2 * {A}` when multiplication is meant.
fn push_number(out: &mut String, value: f64) {
    use std::fmt::Write;
    if value.is_sign_negative() {
        let _ = write!(out, "({})", value);
    } else {
        let _ = write!(out, "{}", value);
    }
}
