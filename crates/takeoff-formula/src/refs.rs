//! Scanning `{token}` references in formula text.

/// One `{token}` occurrence in a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Token text between the braces, trimmed.
    pub token: &'a str,
    /// Byte offset of the opening brace.
    pub start: usize,
    /// Byte offset just past the closing brace.
    pub end: usize,
}

/// Scan a formula left to right for `{token}` references.
///
/// Braces do not nest: a `{` seen before the matching `}` restarts the
/// token. An unterminated `{` ends the scan and is left to the arithmetic
/// sanitizer.
pub fn scan(formula: &str) -> Vec<Reference<'_>> {
    let bytes = formula.as_bytes();
    let mut refs = Vec::new();
    let mut open: Option<usize> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => open = Some(i),
            b'}' => {
                if let Some(start) = open.take() {
                    refs.push(Reference {
                        token: formula[start + 1..i].trim(),
                        start,
                        end: i + 1,
                    });
                }
            }
            _ => {}
        }
    }
    refs
}

/// Distinct tokens referenced by a formula, in first-seen order.
pub fn references(formula: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in scan(formula) {
        if !seen.iter().any(|s| s == r.token) {
            seen.push(r.token.to_string());
        }
    }
    seen
}
