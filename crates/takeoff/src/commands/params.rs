//! `takeoff params` -- list parameters with their resolved values.

use anyhow::Result;

use takeoff_ui::styles::render_warn_icon;

use crate::cli::SnapshotArgs;
use crate::commands::{read_snapshot, token_match};
use crate::context::RuntimeContext;
use crate::output::{Align, output_json, output_table};

/// Execute the `takeoff params` command.
pub fn run(ctx: &RuntimeContext, args: &SnapshotArgs) -> Result<()> {
    let config = ctx.config()?;
    let snapshot = read_snapshot(&args.snapshot)?;
    let resolved = takeoff_formula::Evaluator::new(&snapshot.parameters)
        .with_limits(config.limits())
        .with_token_match(token_match(&config, args.by_id))
        .resolve_all();

    if ctx.json {
        output_json(&resolved);
        return Ok(());
    }

    if resolved.is_empty() {
        if !ctx.quiet {
            println!("No parameters");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = resolved
        .iter()
        .map(|r| {
            let flag = if r.evaluation.has_errors() { " !" } else { "" };
            vec![
                r.name.clone(),
                r.kind.unit().to_string(),
                format!("{}{}", r.evaluation.value, flag),
                r.formula.clone().unwrap_or_default(),
            ]
        })
        .collect();
    output_table(
        &["NAME", "UNIT", "VALUE", "FORMULA"],
        &[Align::Left, Align::Left, Align::Right, Align::Left],
        &rows,
    );

    if !ctx.quiet {
        for r in &resolved {
            if let Some(ref error) = r.evaluation.fallback {
                println!("{} in '{}': {} (used 0)", render_warn_icon(), r.name, error);
            }
            for d in &r.evaluation.diagnostics {
                println!("{} {}", render_warn_icon(), d);
            }
        }
    }

    Ok(())
}
