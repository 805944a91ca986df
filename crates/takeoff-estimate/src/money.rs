//! Currency rounding and formatting for display.
//!
//! Costs are computed at full precision; round only when showing them.

/// Round to `decimals` places, halves away from zero.
pub fn round_currency(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Keep -0.004 from showing up as "-0.00".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Format an amount as `-$1,234.50`: sign, symbol, grouped thousands.
pub fn format_currency(value: f64, decimals: u32, symbol: &str) -> String {
    let rounded = round_currency(value, decimals);
    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + symbol.len() + 4);
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_currency(2.5, 0), 3.0);
        assert_eq!(round_currency(-2.5, 0), -3.0);
        assert_eq!(round_currency(1633.125, 2), 1633.13);
        assert_eq!(round_currency(0.125, 2), 0.13);
        assert_eq!(round_currency(1420.0, 2), 1420.0);
    }

    #[test]
    fn negative_zero_collapses() {
        assert!(round_currency(-0.001, 2).is_sign_positive());
        insta::assert_snapshot!(format_currency(-0.001, 2, "$"), @"$0.00");
    }

    #[test]
    fn formats_with_grouping() {
        insta::assert_snapshot!(format_currency(1633.0, 2, "$"), @"$1,633.00");
        insta::assert_snapshot!(format_currency(213.0, 2, "$"), @"$213.00");
        insta::assert_snapshot!(format_currency(1234567.891, 2, "$"), @"$1,234,567.89");
        insta::assert_snapshot!(format_currency(-98765.4, 2, "$"), @"-$98,765.40");
        insta::assert_snapshot!(format_currency(999.999, 2, "€"), @"€1,000.00");
        insta::assert_snapshot!(format_currency(1633.4, 0, ""), @"1,633");
    }
}
