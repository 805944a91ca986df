//! Discovery and creation of the `.takeoff/` project directory.

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE, ConfigError, TakeoffConfig, save_config};

/// The name of the takeoff project directory.
pub const PROJECT_DIR_NAME: &str = ".takeoff";

/// Environment variable that points at the project directory directly.
pub const PROJECT_DIR_ENV: &str = "TAKEOFF_DIR";

/// Find the `.takeoff/` directory for `start`.
///
/// `TAKEOFF_DIR` wins when it names an existing directory; otherwise the
/// tree is walked upward from `start`.
pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(PROJECT_DIR_ENV) {
        let env_path = PathBuf::from(env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }
    find_project_dir_from(start)
}

/// Walk up from `start` looking for `.takeoff/`, ignoring `TAKEOFF_DIR`.
pub fn find_project_dir_from(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Like [`find_project_dir`], but an error when there is none.
pub fn find_project_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_project_dir(start).ok_or(ConfigError::ProjectDirNotFound)
}

/// Create `<base>/.takeoff/` with a default `config.yaml`.
///
/// An existing config file is left alone. Returns the directory path.
pub fn init_project_dir(base: &Path) -> Result<PathBuf, ConfigError> {
    let dir = if base.ends_with(PROJECT_DIR_NAME) {
        base.to_path_buf()
    } else {
        base.join(PROJECT_DIR_NAME)
    };
    std::fs::create_dir_all(&dir)?;
    if !dir.join(CONFIG_FILE).exists() {
        save_config(&dir, &TakeoffConfig::default())?;
    }
    Ok(dir)
}
