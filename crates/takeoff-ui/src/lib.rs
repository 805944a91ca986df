//! Terminal styling for takeoff output.
//!
//! Colour is applied only when the terminal supports it, so every helper
//! here degrades to plain text when piped or when `NO_COLOR` is set.

pub mod styles;
pub mod terminal;
