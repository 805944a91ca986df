//! `takeoff init` -- create a `.takeoff/` project directory.

use anyhow::{Context, Result};

use takeoff_config::init_project_dir;

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `takeoff init` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let base = ctx.base_dir()?;
    let dir = init_project_dir(&base)
        .with_context(|| format!("failed to initialize project in {}", base.display()))?;

    if ctx.json {
        output_json(&serde_json::json!({
            "path": dir.display().to_string(),
        }));
    } else if !ctx.quiet {
        println!("Initialized takeoff project in {}", dir.display());
    }

    Ok(())
}
