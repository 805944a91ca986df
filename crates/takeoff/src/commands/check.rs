//! `takeoff check` -- validate a snapshot and report formula problems.

use std::collections::HashSet;

use anyhow::{Result, bail};
use serde::Serialize;

use takeoff_core::validation::validate_snapshot;
use takeoff_formula::DiagnosticKind;
use takeoff_formula::graph::find_cycles;
use takeoff_ui::styles::{
    render_fail, render_fail_icon, render_pass, render_pass_icon, render_warn, render_warn_icon,
};

use crate::cli::SnapshotArgs;
use crate::commands::{estimator, read_snapshot};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Problems found in one snapshot, without duplicates.
#[derive(Debug, Default, Serialize)]
struct Report {
    ok: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl Report {
    fn error(&mut self, message: String) {
        if self.seen.insert(message.clone()) {
            self.errors.push(message);
        }
    }

    fn warning(&mut self, message: String) {
        if self.seen.insert(message.clone()) {
            self.warnings.push(message);
        }
    }
}

/// Execute the `takeoff check` command.
pub fn run(ctx: &RuntimeContext, args: &SnapshotArgs) -> Result<()> {
    let config = ctx.config()?;
    let snapshot = read_snapshot(&args.snapshot)?;
    let estimator = estimator(&config, args.by_id, None)?;
    let evaluator = estimator.evaluator(&snapshot);

    let mut report = Report::default();

    if let Err(e) = validate_snapshot(&snapshot) {
        report.error(e.to_string());
    }

    // Each cycle is reported once here rather than once per member.
    for cycle in find_cycles(&evaluator) {
        report.error(format!("cyclic reference {}", cycle.join(" -> ")));
    }

    for resolved in evaluator.resolve_all() {
        if let Some(ref error) = resolved.evaluation.fallback {
            report.error(format!("parameter '{}': {}", resolved.name, error));
        }
        for d in &resolved.evaluation.diagnostics {
            if matches!(d.kind, DiagnosticKind::CyclicReference { .. }) {
                continue;
            }
            let message = format!("parameter '{}': {}", resolved.name, d);
            if d.is_error() {
                report.error(message);
            } else {
                report.warning(message);
            }
        }
    }

    let estimate = estimator.estimate(&snapshot);
    for element in &estimate.diagnostics {
        let prefix = format!("element '{}' {}", element.element_name, element.field);
        if let Some(ref error) = element.fallback {
            report.error(format!("{}: {}", prefix, error));
        }
        for d in &element.diagnostics {
            if matches!(d.kind, DiagnosticKind::CyclicReference { .. }) {
                continue;
            }
            let message = format!("{}: {}", prefix, d);
            if d.is_error() {
                report.error(message);
            } else {
                report.warning(message);
            }
        }
    }

    report.ok = report.errors.is_empty();

    if ctx.json {
        output_json(&report);
    } else {
        for e in &report.errors {
            println!("{} {}", render_fail_icon(), render_fail(e));
        }
        if !ctx.quiet {
            for w in &report.warnings {
                println!("{} {}", render_warn_icon(), render_warn(w));
            }
            if report.ok {
                let summary = format!(
                    "{} parameter(s), {} element(s) checked",
                    snapshot.parameters.len(),
                    snapshot.elements.len()
                );
                println!("{} {}", render_pass_icon(), render_pass(&summary));
            }
        }
    }

    if !report.ok {
        bail!("{} problem(s) found", report.errors.len());
    }
    Ok(())
}
