//! Formula evaluator for takeoff parameters.
//!
//! Formulas are arithmetic over `+ - * / ( )` and decimal literals with
//! `{token}` placeholders naming parameters. Parameters may themselves be
//! formulas; they are resolved recursively with a cycle guard. Evaluation
//! never fails outright: anything that cannot be computed becomes `0` and is
//! reported as a [`types::Diagnostic`].

pub mod engine;
pub mod graph;
pub mod parser;
pub mod refs;
pub mod types;

pub use engine::{Evaluator, ResolvedParameter, evaluate};
pub use types::{Diagnostic, DiagnosticKind, Evaluation, FormulaError, Limits, TokenMatch};
