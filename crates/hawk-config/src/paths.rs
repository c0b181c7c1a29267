//! Config root resolution and on-disk layout.
//!
//! The config root is resolved once at startup — `$HAWK_HOME` when set,
//! otherwise the platform config directory — and passed explicitly
//! through the call graph; nothing below this module reads the
//! environment.
//!
//! ```text
//! <config_root>/
//!   config.yaml       global configuration layer (+ profiles)
//!   packages.yaml     package index
//!   projects.yaml     registered directories
//!   registry/         component store
//!   runners/          generated per-event runners
//!   sync_cache/       per-target sync state
//! <dir>/.hawk/
//!   config.yaml       directory scope layer
//!   runners/
//!   sync_cache/
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Canonical application name for platform config paths.
pub const APP_NAME: &str = "hawk";
/// Environment override for the config root.
pub const ENV_HOME: &str = "HAWK_HOME";
/// Per-directory scope marker.
pub const SCOPE_DIR_NAME: &str = ".hawk";

/// Resolve the config root: `$HAWK_HOME` when set and non-empty,
/// otherwise the platform config dir (`~/.config/hawk` on Linux).
pub fn config_root() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(ENV_HOME) {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .context("Failed to determine config directory (no home directory?)")?;
    Ok(dirs.config_dir().to_path_buf())
}

/// Scope directory for a directory scope (`<dir>/.hawk`).
pub fn scope_dir(dir: &Path) -> PathBuf {
    dir.join(SCOPE_DIR_NAME)
}

pub fn global_config_file(config_root: &Path) -> PathBuf {
    config_root.join("config.yaml")
}

pub fn packages_file(config_root: &Path) -> PathBuf {
    config_root.join("packages.yaml")
}

pub fn projects_file(config_root: &Path) -> PathBuf {
    config_root.join("projects.yaml")
}

pub fn registry_dir(config_root: &Path) -> PathBuf {
    config_root.join("registry")
}

pub fn global_runners_dir(config_root: &Path) -> PathBuf {
    config_root.join("runners")
}

pub fn global_sync_cache_dir(config_root: &Path) -> PathBuf {
    config_root.join("sync_cache")
}

pub fn scope_config_file(dir: &Path) -> PathBuf {
    scope_dir(dir).join("config.yaml")
}

pub fn scope_runners_dir(dir: &Path) -> PathBuf {
    scope_dir(dir).join("runners")
}

pub fn scope_sync_cache_dir(dir: &Path) -> PathBuf {
    scope_dir(dir).join("sync_cache")
}
