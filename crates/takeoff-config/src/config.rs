//! Configuration types and loading.
//!
//! [`TakeoffConfig`] is assembled from three layers, later ones winning:
//! built-in defaults, `.takeoff/config.yaml`, and `TAKEOFF_*` environment
//! variables (`__` separates sections, so `TAKEOFF_FORMULA__MAX_LENGTH=800`
//! sets `formula.max-length`).

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use takeoff_formula::types::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
use takeoff_formula::{Limits, TokenMatch};

/// File name of the project configuration inside `.takeoff/`.
pub const CONFIG_FILE: &str = "config.yaml";

/// Prefix of environment variables that override configuration.
pub const ENV_PREFIX: &str = "TAKEOFF_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Layered(#[from] figment::Error),

    #[error("no .takeoff directory found (run 'takeoff init' first)")]
    ProjectDirNotFound,

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Formula evaluation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FormulaConfig {
    /// Longest formula, in characters, that will be evaluated.
    pub max_length: usize,
    /// Deepest chain of formula parameters that will be followed.
    pub max_depth: usize,
    /// Whether `{token}`s name parameters (`name`) or their ids (`id`).
    pub token_match: TokenMatch,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            token_match: TokenMatch::default(),
        }
    }
}

/// Markup settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MarkupConfig {
    /// Percentage used for snapshots that do not carry a markup policy.
    pub default_percentage: f64,
}

/// How amounts are shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DisplayConfig {
    pub decimals: u32,
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            currency: "$".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full takeoff configuration, corresponding to `.takeoff/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoffConfig {
    pub formula: FormulaConfig,
    pub markup: MarkupConfig,
    pub display: DisplayConfig,
}

impl TakeoffConfig {
    /// Every key accepted by [`get`](Self::get) and [`set`](Self::set).
    pub const KEYS: &'static [&'static str] = &[
        "formula.max-length",
        "formula.max-depth",
        "formula.token-match",
        "markup.default-percentage",
        "display.decimals",
        "display.currency",
    ];

    /// Evaluation limits for these settings.
    pub fn limits(&self) -> Limits {
        Limits {
            max_length: self.formula.max_length,
            max_depth: self.formula.max_depth,
            ..Limits::default()
        }
    }

    /// Reject values no evaluation could work with.
    pub fn validate(&self) -> Result<()> {
        if self.formula.max_length == 0 {
            return Err(invalid("formula.max-length", "must be at least 1"));
        }
        if self.formula.max_depth == 0 {
            return Err(invalid("formula.max-depth", "must be at least 1"));
        }
        let pct = self.markup.default_percentage;
        if !pct.is_finite() || pct < 0.0 {
            return Err(invalid(
                "markup.default-percentage",
                "must be a non-negative number",
            ));
        }
        if self.display.decimals > 10 {
            return Err(invalid("display.decimals", "must be between 0 and 10"));
        }
        Ok(())
    }

    /// The value of a dotted key, as text.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "formula.max-length" => self.formula.max_length.to_string(),
            "formula.max-depth" => self.formula.max_depth.to_string(),
            "formula.token-match" => self.formula.token_match.to_string(),
            "markup.default-percentage" => self.markup.default_percentage.to_string(),
            "display.decimals" => self.display.decimals.to_string(),
            "display.currency" => self.display.currency.clone(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Set a dotted key from text, then re-validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "formula.max-length" => self.formula.max_length = parse(key, value)?,
            "formula.max-depth" => self.formula.max_depth = parse(key, value)?,
            "formula.token-match" => {
                self.formula.token_match = value
                    .parse()
                    .map_err(|reason: String| invalid(key, &reason))?;
            }
            "markup.default-percentage" => self.markup.default_percentage = parse(key, value)?,
            "display.decimals" => self.display.decimals = parse(key, value)?,
            "display.currency" => self.display.currency = value.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        self.validate()
    }

    /// Every key with its current value, in [`KEYS`](Self::KEYS) order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .filter_map(|&k| self.get(k).ok().map(|v| (k, v)))
            .collect()
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| invalid(key, &e.to_string()))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load the layered configuration.
///
/// `project_dir` is the `.takeoff/` directory, if there is one; a missing or
/// empty `config.yaml` contributes nothing. Environment overrides apply
/// either way.
pub fn load_config(project_dir: Option<&Path>) -> Result<TakeoffConfig> {
    let mut figment = Figment::from(Serialized::defaults(TakeoffConfig::default()));

    if let Some(dir) = project_dir {
        let path = dir.join(CONFIG_FILE);
        if path.exists() && !std::fs::read_to_string(&path)?.trim().is_empty() {
            debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Yaml::file(path));
        }
    }

    let config: TakeoffConfig = figment
        .merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .map(|key| key.as_str().replace('_', "-").into()),
        )
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Read `config.yaml` alone, without environment overrides.
///
/// A missing or empty file yields the defaults. Use this when the file is
/// about to be rewritten, so overrides from the environment are not
/// persisted.
pub fn read_config_file(project_dir: &Path) -> Result<TakeoffConfig> {
    let path = project_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(TakeoffConfig::default());
    }
    let content = std::fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(TakeoffConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Save configuration to `config.yaml` inside the given `.takeoff/` directory.
///
/// The directory is created if it does not exist.
pub fn save_config(project_dir: &Path, config: &TakeoffConfig) -> Result<()> {
    std::fs::create_dir_all(project_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(project_dir.join(CONFIG_FILE), yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let cfg = TakeoffConfig::default();
        assert_eq!(cfg.formula.max_length, 500);
        assert_eq!(cfg.formula.max_depth, 32);
        assert_eq!(cfg.formula.token_match, TokenMatch::Name);
        assert_eq!(cfg.markup.default_percentage, 0.0);
        assert_eq!(cfg.display.decimals, 2);
        assert_eq!(cfg.display.currency, "$");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.limits(), Limits::default());
    }

    #[test]
    fn load_without_project_dir() {
        Jail::expect_with(|_jail| {
            let cfg = load_config(None).unwrap();
            assert_eq!(cfg, TakeoffConfig::default());
            Ok(())
        });
    }

    #[test]
    fn load_partial_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                "formula:\n  token-match: id\ndisplay:\n  currency: \"€\"\n",
            )?;
            let cfg = load_config(Some(jail.directory())).unwrap();
            assert_eq!(cfg.formula.token_match, TokenMatch::Id);
            assert_eq!(cfg.formula.max_length, 500);
            assert_eq!(cfg.display.currency, "€");
            assert_eq!(cfg.display.decimals, 2);
            Ok(())
        });
    }

    #[test]
    fn empty_file_yields_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "  \n")?;
            let cfg = load_config(Some(jail.directory())).unwrap();
            assert_eq!(cfg, TakeoffConfig::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                "formula:\n  max-length: 300\nmarkup:\n  default-percentage: 10\n",
            )?;
            jail.set_env("TAKEOFF_FORMULA__MAX_LENGTH", "800");
            jail.set_env("TAKEOFF_DISPLAY__DECIMALS", "0");

            let cfg = load_config(Some(jail.directory())).unwrap();
            assert_eq!(cfg.formula.max_length, 800);
            assert_eq!(cfg.markup.default_percentage, 10.0);
            assert_eq!(cfg.display.decimals, 0);
            assert_eq!(cfg.limits().max_length, 800);
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "formula:\n  max-depth: 0\n")?;
            let err = load_config(Some(jail.directory())).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "formula.max-depth"));
            Ok(())
        });
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "formula: [unclosed\n")?;
            assert!(matches!(
                load_config(Some(jail.directory())),
                Err(ConfigError::Layered(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn roundtrip_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = TakeoffConfig::default();
        cfg.formula.token_match = TokenMatch::Id;
        cfg.markup.default_percentage = 12.5;
        save_config(dir.path(), &cfg).unwrap();

        let content = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(content.contains("token-match: id"));
        let parsed: TakeoffConfig = serde_yaml::from_str(&content).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn read_config_file_ignores_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "display:\n  decimals: 3\n")?;
            jail.set_env("TAKEOFF_DISPLAY__DECIMALS", "0");
            let file_only = read_config_file(jail.directory()).unwrap();
            assert_eq!(file_only.display.decimals, 3);
            assert_eq!(load_config(Some(jail.directory())).unwrap().display.decimals, 0);
            Ok(())
        });
    }

    #[test]
    fn get_and_set_keys() {
        let mut cfg = TakeoffConfig::default();
        cfg.set("formula.token-match", "ID").unwrap();
        cfg.set("markup.default-percentage", "7.5").unwrap();
        cfg.set("display.currency", "CHF ").unwrap();
        assert_eq!(cfg.get("formula.token-match").unwrap(), "id");
        assert_eq!(cfg.get("markup.default-percentage").unwrap(), "7.5");
        assert_eq!(cfg.get("display.currency").unwrap(), "CHF");

        assert!(matches!(
            cfg.set("formula.max-length", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("markup.default-percentage", "-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(cfg.get("nope"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn entries_list_every_key() {
        let entries = TakeoffConfig::default().entries();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, TakeoffConfig::KEYS);
        assert_eq!(entries[0].1, "500");
    }
}
