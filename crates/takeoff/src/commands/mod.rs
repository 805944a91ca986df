//! Command handlers, one module per subcommand.

pub mod check;
pub mod completion;
pub mod config_cmd;
pub mod eval;
pub mod init;
pub mod params;
pub mod preview;
pub mod totals;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result, bail};

use takeoff_config::TakeoffConfig;
use takeoff_core::model::MarkupPolicy;
use takeoff_core::snapshot::{Snapshot, load_snapshot};
use takeoff_estimate::Estimator;
use takeoff_formula::TokenMatch;

/// Load a snapshot file, naming it in any error.
pub(crate) fn read_snapshot(path: &Path) -> Result<Snapshot> {
    load_snapshot(path).with_context(|| format!("failed to load snapshot {}", path.display()))
}

/// `--by-id` wins over the configured token match.
pub(crate) fn token_match(config: &TakeoffConfig, by_id: bool) -> TokenMatch {
    if by_id {
        TokenMatch::Id
    } else {
        config.formula.token_match
    }
}

/// An estimator configured from `config`, with an optional forced markup.
pub(crate) fn estimator(
    config: &TakeoffConfig,
    by_id: bool,
    global_markup: Option<f64>,
) -> Result<Estimator> {
    let mut estimator = Estimator::new()
        .with_limits(config.limits())
        .with_token_match(token_match(config, by_id))
        .with_default_markup(config.markup.default_percentage);
    if let Some(pct) = global_markup {
        if !pct.is_finite() || pct < 0.0 {
            bail!("--global-markup must be a non-negative number, got {}", pct);
        }
        estimator = estimator.with_policy(MarkupPolicy::global(pct));
    }
    Ok(estimator)
}
