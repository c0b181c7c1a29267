//! Managed symlink plumbing shared by adapters.
//!
//! A symlink is "managed" when its target resolves into the registry
//! directory the link projects from. Foreign symlinks and regular files
//! are user property: they are never replaced and surface as ownership
//! conflicts.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Outcome of a single ensure operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Symlink was created.
    Created,
    /// Symlink already points at the correct target.
    AlreadyCorrect,
    /// A managed symlink pointed elsewhere and was re-pointed.
    Replaced,
}

/// Why a link could not be ensured.
#[derive(Debug)]
pub enum LinkConflict {
    /// Destination exists and is a regular file or directory.
    NotASymlink(PathBuf),
    /// Destination is a symlink owned by something else.
    Foreign { path: PathBuf, target: PathBuf },
    Io(String),
}

/// Ensure `link` is a symlink to `target`.
///
/// `managed_root` scopes ownership: only symlinks whose current target
/// lies under it may be replaced.
pub fn ensure_symlink(
    target: &Path,
    link: &Path,
    managed_root: &Path,
) -> std::result::Result<LinkStatus, LinkConflict> {
    match std::fs::symlink_metadata(link) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            create_symlink(target, link).map(|()| LinkStatus::Created)
        }
        Err(err) => Err(LinkConflict::Io(format!(
            "failed to stat {}: {err}",
            link.display()
        ))),
        Ok(meta) if !meta.file_type().is_symlink() => {
            Err(LinkConflict::NotASymlink(link.to_path_buf()))
        }
        Ok(_) => {
            let current = std::fs::read_link(link).map_err(|err| {
                LinkConflict::Io(format!("failed to read link {}: {err}", link.display()))
            })?;
            if current == target {
                return Ok(LinkStatus::AlreadyCorrect);
            }
            if !current.starts_with(managed_root) {
                return Err(LinkConflict::Foreign {
                    path: link.to_path_buf(),
                    target: current,
                });
            }
            std::fs::remove_file(link).map_err(|err| {
                LinkConflict::Io(format!("failed to remove {}: {err}", link.display()))
            })?;
            create_symlink(target, link).map(|()| LinkStatus::Replaced)
        }
    }
}

fn create_symlink(target: &Path, link: &Path) -> std::result::Result<(), LinkConflict> {
    #[cfg(unix)]
    let outcome = std::os::unix::fs::symlink(target, link);
    #[cfg(windows)]
    let outcome = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    outcome.map_err(|err| {
        LinkConflict::Io(format!(
            "failed to link {} -> {}: {err}",
            link.display(),
            target.display()
        ))
    })
}

/// Remove managed symlinks in `dir` whose file name is not in `keep`.
/// Returns the removed paths. Non-symlinks and foreign symlinks are left
/// alone.
pub fn prune_managed_links(
    dir: &Path,
    managed_root: &Path,
    keep: &BTreeSet<String>,
) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if !dir.is_dir() {
        return Ok(removed);
    }
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        if keep.contains(&file_name) {
            continue;
        }
        let meta = std::fs::symlink_metadata(&path)?;
        if !meta.file_type().is_symlink() {
            continue;
        }
        let Ok(target) = std::fs::read_link(&path) else {
            continue;
        };
        if target.starts_with(managed_root) {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove stale link {}", path.display()))?;
            debug!(link = %path.display(), "removed stale managed link");
            removed.push(path);
        }
    }
    Ok(removed)
}
