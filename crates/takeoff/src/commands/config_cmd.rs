//! `takeoff config` -- show or change configuration (list/get/set/path).

use anyhow::{Context, Result};

use takeoff_config::config::CONFIG_FILE;
use takeoff_config::{read_config_file, save_config};

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `takeoff config` command.
pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::List => {
            let config = ctx.config()?;
            let entries = config.entries();
            if ctx.json {
                let map: serde_json::Map<String, serde_json::Value> = entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
                    .collect();
                output_json(&map);
            } else {
                for (key, value) in entries {
                    println!("{} = {}", key, value);
                }
            }
        }

        ConfigCommands::Get(get_args) => {
            let value = ctx.config()?.get(&get_args.key)?;
            if ctx.json {
                output_json(&serde_json::json!({
                    "key": get_args.key,
                    "value": value,
                }));
            } else {
                println!("{}", value);
            }
        }

        ConfigCommands::Set(set_args) => {
            let dir = ctx.require_project_dir().context("cannot set configuration")?;
            // Only the file's own values are rewritten; environment
            // overrides stay out of it.
            let mut config = read_config_file(&dir)?;
            config.set(&set_args.key, &set_args.value)?;
            save_config(&dir, &config)?;
            let value = config.get(&set_args.key)?;

            if ctx.json {
                output_json(&serde_json::json!({
                    "key": set_args.key,
                    "value": value,
                }));
            } else if !ctx.quiet {
                println!("Set {} = {}", set_args.key, value);
            }
        }

        ConfigCommands::Path => {
            let dir = ctx.require_project_dir()?;
            let path = dir.join(CONFIG_FILE);
            if ctx.json {
                output_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "exists": path.exists(),
                }));
            } else {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
