//! Output formatting helpers for the `takeoff` CLI.

use std::io::{self, Write};

use serde::Serialize;

use takeoff_config::TakeoffConfig;
use takeoff_estimate::format_currency;

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Column alignment for [`output_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Print a table with headers and rows.
///
/// `align` gives one alignment per column; missing entries are left-aligned.
pub fn output_table(headers: &[&str], align: &[Align], rows: &[Vec<String>]) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = handle.write_all(render_table(headers, align, rows).as_bytes());
}

pub fn render_table(headers: &[&str], align: &[Align], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths, align);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths, align);
    for row in rows {
        push_row(&mut out, row, &widths, align);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize], align: &[Align]) {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let width = widths.get(i).copied().unwrap_or(0);
        match align.get(i).copied().unwrap_or(Align::Left) {
            Align::Left => line.push_str(&format!("{:<width$}", cell, width = width)),
            Align::Right => line.push_str(&format!("{:>width$}", cell, width = width)),
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Currency formatting from the display config.
#[derive(Debug, Clone)]
pub struct Money {
    decimals: u32,
    symbol: String,
}

impl Money {
    pub fn from_config(config: &TakeoffConfig) -> Self {
        Self {
            decimals: config.display.decimals,
            symbol: config.display.currency.clone(),
        }
    }

    pub fn format(&self, value: f64) -> String {
        format_currency(value, self.decimals, &self.symbol)
    }
}

/// A percentage without trailing zeros: `15%`, `12.5%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_alignment() {
        let rows = vec![
            vec!["Wall Framing".to_string(), "$1,633.00".to_string()],
            vec!["Trim".to_string(), "$87.50".to_string()],
        ];
        let table = render_table(&["ELEMENT", "TOTAL"], &[Align::Left, Align::Right], &rows);
        let expected = [
            "ELEMENT           TOTAL",
            "------------  ---------",
            "Wall Framing  $1,633.00",
            "Trim             $87.50",
        ];
        assert_eq!(table, format!("{}\n", expected.join("\n")));
    }

    #[test]
    fn empty_table_renders_nothing() {
        assert_eq!(render_table(&["A"], &[], &[]), "");
    }

    #[test]
    fn money_uses_display_config() {
        let mut cfg = TakeoffConfig::default();
        assert_eq!(Money::from_config(&cfg).format(1633.0), "$1,633.00");
        cfg.display.decimals = 0;
        cfg.display.currency = "€".into();
        assert_eq!(Money::from_config(&cfg).format(1633.4), "€1,633");
        assert_eq!(format_percent(15.0), "15%");
        assert_eq!(format_percent(12.5), "12.5%");
    }
}
