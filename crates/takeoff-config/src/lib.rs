//! Configuration management for takeoff projects.
//!
//! Settings live in `.takeoff/config.yaml` and can be overridden with
//! `TAKEOFF_*` environment variables. This crate finds the `.takeoff/`
//! directory, layers the sources, and exposes typed access to the result.

pub mod config;
pub mod project_dir;

pub use config::{ConfigError, TakeoffConfig, load_config, read_config_file, save_config};
pub use project_dir::{find_project_dir, find_project_dir_or_error, init_project_dir};
