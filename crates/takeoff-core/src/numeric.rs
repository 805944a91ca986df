//! Numeric coercion.
//!
//! Parameter values and markups arrive as either numbers or free-form
//! strings. [`parse_numeric_or_zero`] is the one rule that turns them into
//! `f64`: take the longest leading decimal literal, and fall back to `0.0`
//! when there is none.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A value that may be written as a number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Coerce to a number with [`parse_numeric_or_zero`].
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n,
            Self::Number(_) => 0.0,
            Self::Text(s) => parse_numeric_or_zero(s),
        }
    }

    /// The raw text of this input, suitable for formula evaluation.
    pub fn as_formula(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Returns `true` if the input is an empty or whitespace-only string.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Returns `true` if a text input has no usable numeric prefix.
    pub fn is_non_numeric(&self) -> bool {
        match self {
            Self::Number(n) => !n.is_finite(),
            Self::Text(s) => !s.trim().is_empty() && leading_number(s).is_none(),
        }
    }
}

impl Default for NumericInput {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for NumericInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Coerce a string to a number, or `0.0` if it has no numeric prefix.
///
/// Leading whitespace is ignored and trailing garbage is dropped, so
/// `"12.5 ft"` yields `12.5` and `"abc"` yields `0.0`. Non-finite results
/// also collapse to `0.0`.
pub fn parse_numeric_or_zero(input: &str) -> f64 {
    leading_number(input).unwrap_or(0.0)
}

/// Parse a string that is entirely a finite decimal literal.
///
/// Surrounding whitespace is allowed; anything else makes this return `None`.
pub fn parse_strict_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (value, consumed) = scan_decimal(trimmed)?;
    if consumed != trimmed.len() {
        return None;
    }
    value.is_finite().then_some(value)
}

fn leading_number(input: &str) -> Option<f64> {
    let (value, _) = scan_decimal(input.trim_start())?;
    value.is_finite().then_some(value)
}

/// Scan the longest decimal literal at the start of `s`.
///
/// Returns the parsed value and the number of bytes consumed.
fn scan_decimal(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    if i < len && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let int_start = i;
    while i < len && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < len && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        i = j;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts if at least one digit follows it.
    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    s[..i].parse::<f64>().ok().map(|v| (v, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_plain_numbers() {
        assert_eq!(parse_numeric_or_zero("42"), 42.0);
        assert_eq!(parse_numeric_or_zero("-3.5"), -3.5);
        assert_eq!(parse_numeric_or_zero("  7 "), 7.0);
        assert_eq!(parse_numeric_or_zero(".25"), 0.25);
        assert_eq!(parse_numeric_or_zero("5."), 5.0);
    }

    #[test]
    fn coerce_takes_leading_prefix() {
        assert_eq!(parse_numeric_or_zero("12.5 ft"), 12.5);
        assert_eq!(parse_numeric_or_zero("3e2x"), 300.0);
        assert_eq!(parse_numeric_or_zero("3e"), 3.0);
        assert_eq!(parse_numeric_or_zero("1.2.3"), 1.2);
    }

    #[test]
    fn coerce_garbage_is_zero() {
        assert_eq!(parse_numeric_or_zero(""), 0.0);
        assert_eq!(parse_numeric_or_zero("abc"), 0.0);
        assert_eq!(parse_numeric_or_zero("-"), 0.0);
        assert_eq!(parse_numeric_or_zero("."), 0.0);
        assert_eq!(parse_numeric_or_zero("1e999"), 0.0);
    }

    #[test]
    fn strict_parse_rejects_trailing_text() {
        assert_eq!(parse_strict_number(" 42 "), Some(42.0));
        assert_eq!(parse_strict_number("1e3"), Some(1000.0));
        assert_eq!(parse_strict_number("12 ft"), None);
        assert_eq!(parse_strict_number("{A}"), None);
        assert_eq!(parse_strict_number(""), None);
        assert_eq!(parse_strict_number("inf"), None);
        assert_eq!(parse_strict_number("NaN"), None);
    }

    #[test]
    fn numeric_input_coercion() {
        assert_eq!(NumericInput::Number(4.0).to_number(), 4.0);
        assert_eq!(NumericInput::from("15").to_number(), 15.0);
        assert_eq!(NumericInput::from("").to_number(), 0.0);
        assert!(NumericInput::from("   ").is_blank());
        assert!(NumericInput::from("n/a").is_non_numeric());
        assert!(!NumericInput::from("").is_non_numeric());
        assert!(!NumericInput::from("8 in").is_non_numeric());
    }

    #[test]
    fn numeric_input_deserializes_both_shapes() {
        let n: NumericInput = serde_json::from_str("12.5").unwrap();
        assert_eq!(n, NumericInput::Number(12.5));
        let s: NumericInput = serde_json::from_str("\"{A} * 2\"").unwrap();
        assert_eq!(s.as_formula(), "{A} * 2");
    }
}
