//! `takeoff preview` -- per-element cost previews.

use anyhow::{Context, Result};
use serde::Serialize;

use takeoff_core::validation::validate_snapshot;
use takeoff_estimate::{CostPreview, ElementDiagnostics};
use takeoff_ui::styles::{render_fail_icon, render_muted, render_warn_icon};

use crate::cli::PreviewArgs;
use crate::commands::{estimator, read_snapshot};
use crate::context::RuntimeContext;
use crate::output::{Align, Money, format_percent, output_json, output_table};

#[derive(Serialize)]
struct PreviewOutput<'a> {
    previews: &'a [CostPreview],
    diagnostics: &'a [ElementDiagnostics],
}

/// Execute the `takeoff preview` command.
pub fn run(ctx: &RuntimeContext, args: &PreviewArgs) -> Result<()> {
    let config = ctx.config()?;
    let snapshot = read_snapshot(&args.input.snapshot)?;
    validate_snapshot(&snapshot).context("invalid snapshot")?;

    let estimate =
        estimator(&config, args.input.by_id, args.global_markup)?.estimate(&snapshot);

    if ctx.json {
        if args.diagnostics {
            output_json(&PreviewOutput {
                previews: &estimate.previews,
                diagnostics: &estimate.diagnostics,
            });
        } else {
            output_json(&estimate.previews);
        }
        return Ok(());
    }

    if estimate.previews.is_empty() {
        if !ctx.quiet {
            println!("No elements");
        }
        return Ok(());
    }

    let money = Money::from_config(&config);
    let rows: Vec<Vec<String>> = estimate
        .previews
        .iter()
        .map(|p| {
            let category = snapshot
                .category(&p.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| p.category_id.clone());
            vec![
                p.element_name.clone(),
                category,
                money.format(p.material_cost),
                money.format(p.labor_cost),
                money.format(p.base_cost),
                format_percent(p.markup_percentage),
                money.format(p.markup_amount),
                money.format(p.total_cost),
            ]
        })
        .collect();
    output_table(
        &[
            "ELEMENT", "CATEGORY", "MATERIAL", "LABOR", "BASE", "MARKUP %", "MARKUP", "TOTAL",
        ],
        &[
            Align::Left,
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
        ],
        &rows,
    );

    if ctx.quiet {
        return Ok(());
    }
    if args.diagnostics {
        println!();
        print_diagnostics(&estimate.diagnostics);
    } else if !estimate.diagnostics.is_empty() {
        println!();
        println!(
            "{}",
            render_muted(&format!(
                "{} element field(s) reported problems; rerun with --diagnostics",
                estimate.diagnostics.len()
            ))
        );
    }

    Ok(())
}

fn print_diagnostics(diagnostics: &[ElementDiagnostics]) {
    if diagnostics.is_empty() {
        println!("No problems");
        return;
    }
    for d in diagnostics {
        let icon = if d.has_errors() {
            render_fail_icon()
        } else {
            render_warn_icon()
        };
        println!("{} {} ({})", icon, d.element_name, d.field);
        if let Some(ref error) = d.fallback {
            println!("    {} (used 0)", error);
        }
        for diag in &d.diagnostics {
            println!("    {}", diag);
        }
    }
}
