//! Runtime context for command execution.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use takeoff_config::{
    ConfigError, TakeoffConfig, find_project_dir, find_project_dir_or_error, load_config,
};

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// `--project`, as given.
    pub project: Option<PathBuf>,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            project: global.project.clone(),
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// The directory new projects are created under: `--project` or the
    /// current directory.
    pub fn base_dir(&self) -> Result<PathBuf> {
        match self.project {
            Some(ref p) => Ok(p.clone()),
            None => env::current_dir().context("failed to get current directory"),
        }
    }

    /// The `.takeoff/` directory in effect, if any.
    ///
    /// `--project` may name either the `.takeoff/` directory itself or a
    /// directory containing one.
    pub fn project_dir(&self) -> Option<PathBuf> {
        match self.project {
            Some(ref p) => resolve_explicit(p),
            None => find_project_dir(&env::current_dir().ok()?),
        }
    }

    /// Like [`project_dir`](Self::project_dir), but an error when there is
    /// no project.
    pub fn require_project_dir(&self) -> Result<PathBuf, ConfigError> {
        match self.project {
            Some(ref p) => resolve_explicit(p).ok_or(ConfigError::ProjectDirNotFound),
            None => {
                let cwd = env::current_dir()?;
                find_project_dir_or_error(&cwd)
            }
        }
    }

    /// Load the layered configuration for this project.
    pub fn config(&self) -> Result<TakeoffConfig> {
        let dir = self.project_dir();
        load_config(dir.as_deref()).context("failed to load configuration")
    }
}

fn resolve_explicit(path: &Path) -> Option<PathBuf> {
    let nested = path.join(takeoff_config::project_dir::PROJECT_DIR_NAME);
    if nested.is_dir() {
        Some(nested)
    } else if path.is_dir() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_project_accepts_parent_or_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".takeoff");
        std::fs::create_dir(&dir).unwrap();

        assert_eq!(resolve_explicit(tmp.path()), Some(dir.clone()));
        assert_eq!(resolve_explicit(&dir), Some(dir));
        assert_eq!(resolve_explicit(&tmp.path().join("missing")), None);
    }

    #[test]
    fn require_project_dir_with_explicit_path() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = |project: PathBuf| RuntimeContext {
            project: Some(project),
            json: false,
            verbose: false,
            quiet: false,
        };

        assert!(matches!(
            ctx(tmp.path().join("missing")).require_project_dir(),
            Err(ConfigError::ProjectDirNotFound)
        ));

        let dir = tmp.path().join(".takeoff");
        std::fs::create_dir(&dir).unwrap();
        assert_eq!(ctx(tmp.path().to_path_buf()).require_project_dir().unwrap(), dir);
    }
}
