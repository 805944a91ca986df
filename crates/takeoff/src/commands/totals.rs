//! `takeoff totals` -- category subtotals and the grand total.

use anyhow::{Context, Result};
use serde::Serialize;

use takeoff_core::validation::validate_snapshot;
use takeoff_estimate::{CategorySubtotal, CostTotals};
use takeoff_ui::styles::{
    render_amount, render_bold, render_category, render_separator, render_total,
};

use crate::cli::TotalsArgs;
use crate::commands::{estimator, read_snapshot};
use crate::context::RuntimeContext;
use crate::output::{Align, Money, output_json, output_table};

#[derive(Serialize)]
struct TotalsOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a [CategorySubtotal]>,
    totals: CostTotals,
}

/// Execute the `takeoff totals` command.
pub fn run(ctx: &RuntimeContext, args: &TotalsArgs) -> Result<()> {
    let config = ctx.config()?;
    let snapshot = read_snapshot(&args.input.snapshot)?;
    validate_snapshot(&snapshot).context("invalid snapshot")?;

    let estimate =
        estimator(&config, args.input.by_id, args.global_markup)?.estimate(&snapshot);

    if ctx.json {
        output_json(&TotalsOutput {
            categories: args.by_category.then_some(estimate.categories.as_slice()),
            totals: estimate.totals,
        });
        return Ok(());
    }

    let money = Money::from_config(&config);

    if args.by_category && !estimate.categories.is_empty() {
        let rows: Vec<Vec<String>> = estimate
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category_name
                        .clone()
                        .unwrap_or_else(|| format!("({})", c.category_id)),
                    c.element_count.to_string(),
                    money.format(c.totals.material_cost),
                    money.format(c.totals.labor_cost),
                    money.format(c.totals.markup_amount),
                    money.format(c.totals.total_cost),
                ]
            })
            .collect();
        println!("{}", render_category("By category"));
        output_table(
            &["CATEGORY", "ELEMENTS", "MATERIAL", "LABOR", "MARKUP", "TOTAL"],
            &[
                Align::Left,
                Align::Right,
                Align::Right,
                Align::Right,
                Align::Right,
                Align::Right,
            ],
            &rows,
        );
        println!();
    }

    let t = &estimate.totals;
    let lines = [
        ("Material", money.format(t.material_cost), t.material_cost),
        ("Labor", money.format(t.labor_cost), t.labor_cost),
        ("Markup", money.format(t.markup_amount), t.markup_amount),
    ];
    let total = money.format(t.total_cost);
    let width = lines
        .iter()
        .map(|(_, text, _)| text.chars().count())
        .chain(std::iter::once(total.chars().count()))
        .max()
        .unwrap_or(0);

    for (label, text, value) in &lines {
        println!(
            "{:<10}{}",
            label,
            render_amount(&format!("{:>width$}", text, width = width), *value)
        );
    }
    println!("{}", render_separator(10 + width));
    println!(
        "{}{}",
        render_bold(&format!("{:<10}", "Total")),
        render_total(&format!("{:>width$}", total, width = width))
    );

    Ok(())
}
