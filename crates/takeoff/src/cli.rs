//! Clap CLI definitions for the `takeoff` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// takeoff -- formula-driven construction cost estimates.
///
/// Evaluates parameter formulas and rolls element costs up into category
/// subtotals and a marked-up grand total.
#[derive(Parser, Debug)]
#[command(
    name = "takeoff",
    about = "Formula-driven construction cost estimates",
    long_about = "Evaluates parameter formulas and rolls element costs up into category subtotals and a marked-up grand total.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Project directory (default: nearest .takeoff/, or $TAKEOFF_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single formula.
    Eval(EvalArgs),

    /// List a snapshot's parameters with their resolved values.
    Params(SnapshotArgs),

    /// Show per-element cost previews.
    Preview(PreviewArgs),

    /// Show category subtotals and the grand total.
    Totals(TotalsArgs),

    /// Validate a snapshot and report formula problems.
    Check(SnapshotArgs),

    /// Create a .takeoff/ project directory with a default config.
    Init,

    /// Show or change configuration.
    Config(ConfigArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Arguments for commands that read one snapshot file.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Snapshot file (JSON, YAML, or TOML).
    pub snapshot: PathBuf,

    /// Match `{token}`s against parameter ids instead of names.
    #[arg(long)]
    pub by_id: bool,
}

// ---------------------------------------------------------------------------
// Eval
// ---------------------------------------------------------------------------

/// Arguments for `takeoff eval`.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// The formula, e.g. "{Wall Length} * {Wall Height} * 4.5".
    pub formula: String,

    /// Literal parameter, NAME=VALUE (repeatable).
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Formula parameter, NAME=FORMULA (repeatable).
    #[arg(short = 'f', long = "param-formula", value_name = "NAME=FORMULA")]
    pub formulas: Vec<String>,

    /// Take parameters from a snapshot file.
    #[arg(long = "params", value_name = "FILE")]
    pub params_file: Option<PathBuf>,

    /// Match `{token}`s against parameter ids instead of names.
    #[arg(long)]
    pub by_id: bool,

    /// List everything that was substituted with 0 or ignored.
    #[arg(long)]
    pub explain: bool,
}

// ---------------------------------------------------------------------------
// Preview / Totals
// ---------------------------------------------------------------------------

/// Arguments for `takeoff preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Force this markup percentage on every element.
    #[arg(long, value_name = "PCT")]
    pub global_markup: Option<f64>,

    /// List elements whose formulas fell back to 0 or produced warnings.
    #[arg(long)]
    pub diagnostics: bool,
}

/// Arguments for `takeoff totals`.
#[derive(Args, Debug)]
pub struct TotalsArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Also show one subtotal per category.
    #[arg(long)]
    pub by_category: bool,

    /// Force this markup percentage on every element.
    #[arg(long, value_name = "PCT")]
    pub global_markup: Option<f64>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Arguments for `takeoff config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// List the effective configuration (defaults, file, environment).
    List,
    /// Get one effective configuration value.
    Get(ConfigGetArgs),
    /// Set a value in .takeoff/config.yaml.
    Set(ConfigSetArgs),
    /// Print the path of the project config file.
    Path,
}

/// Arguments for `takeoff config get`.
#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Configuration key, e.g. `formula.max-length`.
    pub key: String,
}

/// Arguments for `takeoff config set`.
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Arguments for `takeoff completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

/// Completion subcommands.
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate Bash completions.
    Bash,
    /// Generate Zsh completions.
    Zsh,
    /// Generate Fish completions.
    Fish,
    /// Generate PowerShell completions.
    Powershell,
}
