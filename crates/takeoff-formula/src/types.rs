//! Evaluation results, diagnostics, and limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default maximum formula length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Default maximum depth of nested formula-valued parameters.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum parenthesis nesting inside one expression.
pub const DEFAULT_MAX_NESTING: usize = 64;

/// Bounds on the work a single evaluation may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Formulas longer than this (in characters) evaluate to `0`.
    pub max_length: usize,
    /// Formula parameters nested deeper than this resolve to `0`.
    pub max_depth: usize,
    /// Parentheses nested deeper than this make the expression malformed.
    pub max_nesting: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// How `{token}` text is matched against parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMatch {
    /// Match by name first, then by id.
    #[default]
    Name,
    /// Match by id only.
    Id,
}

impl TokenMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
        }
    }
}

impl fmt::Display for TokenMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "id" => Ok(Self::Id),
            other => Err(format!("unknown token match '{}': expected 'name' or 'id'", other)),
        }
    }
}

/// Reasons a formula as a whole fails to produce a number.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum FormulaError {
    #[error("formula is {length} characters long (limit {limit})")]
    TooLong { length: usize, limit: usize },

    #[error("malformed expression at offset {position}: {reason}")]
    Malformed { position: usize, reason: String },

    #[error("expression does not evaluate to a finite number")]
    NonFinite,
}

impl FormulaError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }
}

/// Something worth reporting that happened while resolving a formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// The formula parameter being resolved when this happened
    /// (`None` for the top-level formula).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

/// What a [`Diagnostic`] is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A token matched no parameter; it was replaced by `0`.
    MissingReference { token: String },

    /// A token closed a reference cycle; it was replaced by `0`.
    CyclicReference { chain: Vec<String> },

    /// A token would nest formula parameters too deeply; replaced by `0`.
    DepthExceeded { token: String, limit: usize },

    /// A literal parameter value has no numeric prefix; coerced to `0`.
    NonNumericValue { token: String, raw: String },

    /// Characters outside the arithmetic alphabet were dropped.
    StrippedCharacters { characters: String },

    /// A referenced parameter's own formula failed; it resolved to `0`.
    FormulaFailed { error: FormulaError },
}

impl Diagnostic {
    /// Returns `true` if this diagnostic means some value was forced to `0`.
    pub fn is_error(&self) -> bool {
        !matches!(
            self.kind,
            DiagnosticKind::StrippedCharacters { .. } | DiagnosticKind::NonNumericValue { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref p) = self.parameter {
            write!(f, "in '{}': ", p)?;
        }
        match &self.kind {
            DiagnosticKind::MissingReference { token } => {
                write!(f, "unknown reference {{{}}} (used 0)", token)
            }
            DiagnosticKind::CyclicReference { chain } => {
                write!(f, "cyclic reference {} (used 0)", chain.join(" -> "))
            }
            DiagnosticKind::DepthExceeded { token, limit } => write!(
                f,
                "reference {{{}}} nests deeper than {} levels (used 0)",
                token, limit
            ),
            DiagnosticKind::NonNumericValue { token, raw } => {
                write!(f, "value of {{{}}} is not numeric: '{}' (used 0)", token, raw)
            }
            DiagnosticKind::StrippedCharacters { characters } => {
                write!(f, "ignored characters '{}'", characters)
            }
            DiagnosticKind::FormulaFailed { error } => write!(f, "{} (used 0)", error),
        }
    }
}

/// The outcome of evaluating one formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// The numeric result (`0` when the formula failed).
    pub value: f64,

    /// Why the formula itself failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FormulaError>,

    /// Everything reported along the way, in encounter order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation {
    pub(crate) fn ok(value: f64, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            value,
            fallback: None,
            diagnostics,
        }
    }

    pub(crate) fn failed(error: FormulaError, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            value: 0.0,
            fallback: Some(error),
            diagnostics,
        }
    }

    /// Returns `true` if the formula itself failed and `0` was substituted.
    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }

    /// Returns `true` if anything (the formula or a reference) was zeroed.
    pub fn has_errors(&self) -> bool {
        self.fell_back() || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns `true` if there is nothing to report at all.
    pub fn is_clean(&self) -> bool {
        self.fallback.is_none() && self.diagnostics.is_empty()
    }
}
