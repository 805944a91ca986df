//! Core types for takeoff estimates.
//!
//! This crate holds the plain data handed to the formula evaluator and the
//! cost aggregator: parameters, elements, categories, the markup policy, and
//! the snapshot file that bundles them. It also owns the single numeric
//! coercion rule used everywhere else.

pub mod enums;
pub mod model;
pub mod numeric;
pub mod snapshot;
pub mod validation;
