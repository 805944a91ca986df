//! `takeoff eval` -- evaluate one formula.

use anyhow::{Result, bail};
use serde::Serialize;

use takeoff_core::model::{Parameter, ParameterBuilder};
use takeoff_formula::{Evaluation, Evaluator};
use takeoff_ui::styles::{render_fail_icon, render_warn_icon};

use crate::cli::EvalArgs;
use crate::commands::{read_snapshot, token_match};
use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Serialize)]
struct EvalOutput<'a> {
    formula: &'a str,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

/// Execute the `takeoff eval` command.
pub fn run(ctx: &RuntimeContext, args: &EvalArgs) -> Result<()> {
    let config = ctx.config()?;
    let parameters = collect_parameters(args)?;

    let evaluator = Evaluator::new(&parameters)
        .with_limits(config.limits())
        .with_token_match(token_match(&config, args.by_id));
    let evaluation = evaluator.evaluate_detailed(Some(args.formula.as_str()));

    if ctx.json {
        output_json(&EvalOutput {
            formula: &args.formula,
            evaluation: &evaluation,
        });
        return Ok(());
    }

    println!("{}", evaluation.value);

    if args.explain {
        if let Some(ref error) = evaluation.fallback {
            println!("{} {} (used 0)", render_fail_icon(), error);
        }
        for d in &evaluation.diagnostics {
            let icon = if d.is_error() {
                render_fail_icon()
            } else {
                render_warn_icon()
            };
            println!("{} {}", icon, d);
        }
    } else if !evaluation.is_clean() && !ctx.quiet {
        let count = evaluation.diagnostics.len() + usize::from(evaluation.fell_back());
        eprintln!("{} problem(s) while evaluating; rerun with --explain", count);
    }

    Ok(())
}

/// Parameters from `-p`/`-f` flags first, then from `--params FILE`.
///
/// The first parameter with a given name wins, so flags override the file.
fn collect_parameters(args: &EvalArgs) -> Result<Vec<Parameter>> {
    let mut parameters = Vec::new();
    for raw in &args.params {
        let (name, value) = split_assignment(raw, "--param")?;
        parameters.push(ParameterBuilder::new(name).value(value).build());
    }
    for raw in &args.formulas {
        let (name, formula) = split_assignment(raw, "--param-formula")?;
        parameters.push(ParameterBuilder::new(name).formula(formula).build());
    }
    if let Some(ref path) = args.params_file {
        parameters.extend(read_snapshot(path)?.parameters);
    }
    Ok(parameters)
}

/// Split `NAME=VALUE` at the first `=`.
fn split_assignment<'a>(raw: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => bail!("{} expects NAME=VALUE, got '{}'", flag, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_assignment_keeps_formula_equals() {
        assert_eq!(
            split_assignment("Wall Area = {A} * 2", "-f").unwrap(),
            ("Wall Area", " {A} * 2")
        );
        assert_eq!(split_assignment("X=", "-p").unwrap(), ("X", ""));
        assert!(split_assignment("=5", "-p").is_err());
        assert!(split_assignment("X", "-p").is_err());
    }
}
