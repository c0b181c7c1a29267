//! Package install and update/diff engine.
//!
//! Installs scan a source tree, add every discovered component to the
//! registry, and record provenance in the package index. Updates
//! re-acquire the source (shallow clone for git, re-scan for local),
//! diff each candidate item by content hash and apply:
//!
//! - hash equal            → unchanged
//! - hash differs          → updated (registry replace)
//! - absent upstream       → prune candidate (removed only with `prune`)
//! - new upstream          → added

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use hawk_core::{ComponentType, HawkError, content_hash};

use crate::git;
use crate::index::{PackageEntry, PackageIndex, PackageItem, SourceKind, package_name_from_url, today};
use crate::registry::Registry;
use crate::scan::{ScannedItem, scan_tree};

/// Options shared by install and update.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Remove items that disappeared upstream.
    pub prune: bool,
    /// Re-apply even when the upstream commit is unchanged.
    pub force: bool,
    /// Overwrite clashing components on install.
    pub replace: bool,
    pub git_timeout: Duration,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            prune: false,
            force: false,
            replace: false,
            git_timeout: git::DEFAULT_GIT_TIMEOUT,
        }
    }
}

/// Outcome of installing a package.
#[derive(Debug)]
pub struct InstallReport {
    pub package: String,
    pub items: Vec<PackageItem>,
}

/// Outcome of updating one package.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub package: String,
    /// Set when nothing was applied, with the reason.
    pub skipped: Option<String>,
    /// New upstream commit for git packages.
    pub commit: Option<String>,
    pub unchanged: Vec<(ComponentType, String)>,
    pub updated: Vec<(ComponentType, String)>,
    pub added: Vec<(ComponentType, String)>,
    pub pruned: Vec<(ComponentType, String)>,
    /// Items absent upstream but kept because `prune` was off.
    pub prune_candidates: Vec<(ComponentType, String)>,
}

impl UpdateReport {
    pub fn changed(&self) -> bool {
        !self.updated.is_empty() || !self.added.is_empty() || !self.pruned.is_empty()
    }
}

/// Install a package from a git URL.
pub fn install_git(
    index: &mut PackageIndex,
    registry: &Registry,
    url: &str,
    name_override: Option<&str>,
    options: &UpdateOptions,
) -> Result<InstallReport> {
    let package = match name_override {
        Some(name) => name.to_string(),
        None => package_name_from_url(url)?,
    };

    let temp = tempfile::tempdir().context("failed to create temp clone dir")?;
    let checkout = temp.path().join("checkout");
    git::shallow_clone(url, &checkout, options.git_timeout)?;
    let commit = git::head_commit(&checkout)?;

    let items = apply_tree(index, registry, &package, &checkout, options)?;
    let entry = PackageEntry {
        source: Some(SourceKind::Git.as_str().to_string()),
        url: Some(url.to_string()),
        commit: Some(commit),
        path: None,
        installed: today(),
        items: items.clone(),
    };
    index.record(&package, entry)?;
    index.save()?;

    Ok(InstallReport { package, items })
}

/// Install a package by scanning a local directory.
pub fn install_local(
    index: &mut PackageIndex,
    registry: &Registry,
    path: &Path,
    name_override: Option<&str>,
    options: &UpdateOptions,
) -> Result<InstallReport> {
    if !path.is_dir() {
        bail!("source directory does not exist: {}", path.display());
    }
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    let package = match name_override {
        Some(name) => name.to_string(),
        None => canonical
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("cannot derive a package name from {}", path.display()))?,
    };

    let items = apply_tree(index, registry, &package, &canonical, options)?;
    let entry = PackageEntry {
        source: Some(SourceKind::Local.as_str().to_string()),
        url: None,
        commit: None,
        path: Some(canonical),
        installed: today(),
        items: items.clone(),
    };
    index.record(&package, entry)?;
    index.save()?;

    Ok(InstallReport { package, items })
}

/// Update one package against its recorded source.
pub fn update_package(
    index: &mut PackageIndex,
    registry: &Registry,
    name: &str,
    options: &UpdateOptions,
) -> Result<UpdateReport> {
    let entry = index
        .get(name)
        .cloned()
        .ok_or_else(|| HawkError::PackageNotFound(name.to_string()))?;

    match entry.source_kind() {
        SourceKind::Manual => Ok(UpdateReport {
            package: name.to_string(),
            skipped: Some("manual package; nothing to update".to_string()),
            ..Default::default()
        }),
        SourceKind::Git => update_git(index, registry, name, &entry, options),
        SourceKind::Local => update_local(index, registry, name, &entry, options),
    }
}

fn update_git(
    index: &mut PackageIndex,
    registry: &Registry,
    name: &str,
    entry: &PackageEntry,
    options: &UpdateOptions,
) -> Result<UpdateReport> {
    let url = entry
        .url
        .as_deref()
        .with_context(|| format!("package '{name}' has no url"))?;

    let temp = tempfile::tempdir().context("failed to create temp clone dir")?;
    let checkout = temp.path().join("checkout");
    git::shallow_clone(url, &checkout, options.git_timeout)?;
    let commit = git::head_commit(&checkout)?;

    if entry.commit.as_deref() == Some(commit.as_str()) && !options.force {
        return Ok(UpdateReport {
            package: name.to_string(),
            skipped: Some(format!("already at {}", hawk_core::short_hash(&commit))),
            commit: Some(commit),
            ..Default::default()
        });
    }

    let mut report = diff_apply(registry, name, entry, &checkout, options)?;
    report.commit = Some(commit.clone());

    let new_entry = PackageEntry {
        source: Some(SourceKind::Git.as_str().to_string()),
        url: Some(url.to_string()),
        commit: Some(commit),
        path: None,
        installed: today(),
        items: rebuild_items(entry, &report, registry)?,
    };
    index.record(name, new_entry)?;
    index.save()?;
    Ok(report)
}

fn update_local(
    index: &mut PackageIndex,
    registry: &Registry,
    name: &str,
    entry: &PackageEntry,
    options: &UpdateOptions,
) -> Result<UpdateReport> {
    let path = entry
        .path
        .as_deref()
        .with_context(|| format!("package '{name}' has no path"))?;
    if !path.is_dir() {
        bail!(HawkError::SourcePathMissing {
            name: name.to_string(),
            path: path.display().to_string(),
        });
    }

    let report = diff_apply(registry, name, entry, path, options)?;

    let new_entry = PackageEntry {
        source: Some(SourceKind::Local.as_str().to_string()),
        url: None,
        commit: None,
        path: Some(path.to_path_buf()),
        installed: today(),
        items: rebuild_items(entry, &report, registry)?,
    };
    index.record(name, new_entry)?;
    index.save()?;
    Ok(report)
}

/// Diff scanned candidates against the stored items and apply changes to
/// the registry.
fn diff_apply(
    registry: &Registry,
    package: &str,
    entry: &PackageEntry,
    tree: &Path,
    options: &UpdateOptions,
) -> Result<UpdateReport> {
    let mut report = UpdateReport {
        package: package.to_string(),
        ..Default::default()
    };

    let scanned = scan_tree(tree)?;
    for item in &scanned {
        let new_hash = content_hash(&item.path)
            .with_context(|| format!("failed to hash {}", item.path.display()))?;
        let key = (item.component_type, item.name.clone());
        let stored = entry
            .items
            .iter()
            .find(|i| i.component_type == item.component_type && i.name == item.name);
        match stored {
            Some(stored) if stored.hash == new_hash && !options.force => {
                report.unchanged.push(key);
            }
            Some(_) => {
                registry.add(item.component_type, &item.name, &item.path, true)?;
                report.updated.push(key);
            }
            None => {
                registry.add(item.component_type, &item.name, &item.path, true)?;
                report.added.push(key);
            }
        }
    }

    for stored in &entry.items {
        let still_upstream = scanned
            .iter()
            .any(|i| i.component_type == stored.component_type && i.name == stored.name);
        if still_upstream {
            continue;
        }
        let key = (stored.component_type, stored.name.clone());
        if options.prune {
            registry.remove(stored.component_type, &stored.name)?;
            report.pruned.push(key);
        } else {
            debug!(
                kind = stored.component_type.as_str(),
                name = stored.name.as_str(),
                "item absent upstream, kept (no --prune)"
            );
            report.prune_candidates.push(key);
        }
    }

    Ok(report)
}

/// Item list for the updated index entry: everything now present
/// upstream with fresh hashes, plus prune candidates kept on disk.
fn rebuild_items(
    entry: &PackageEntry,
    report: &UpdateReport,
    registry: &Registry,
) -> Result<Vec<PackageItem>> {
    let mut items = Vec::new();
    for (component_type, name) in report
        .unchanged
        .iter()
        .chain(&report.updated)
        .chain(&report.added)
    {
        items.push(PackageItem {
            component_type: *component_type,
            name: name.clone(),
            hash: registry.get_hash(*component_type, name)?,
        });
    }
    for (component_type, name) in &report.prune_candidates {
        if let Some(stored) = entry
            .items
            .iter()
            .find(|i| i.component_type == *component_type && i.name == *name)
        {
            items.push(stored.clone());
        }
    }
    Ok(items)
}

/// Add every scanned item to the registry for an install, honoring
/// clash detection.
fn apply_tree(
    index: &PackageIndex,
    registry: &Registry,
    package: &str,
    tree: &Path,
    options: &UpdateOptions,
) -> Result<Vec<PackageItem>> {
    let scanned = scan_tree(tree)?;
    if scanned.is_empty() {
        bail!(
            "no components found under {} (expected skills/, hooks/, prompts/, agents/ or mcp/)",
            tree.display()
        );
    }

    let keys: Vec<(ComponentType, String)> = scanned
        .iter()
        .map(|i| (i.component_type, i.name.clone()))
        .collect();
    let clashes: Vec<(ComponentType, String)> = registry
        .check_clashes(&keys)
        .into_iter()
        .filter(|(component_type, name)| {
            index.owner_of(*component_type, name) != Some(package)
        })
        .collect();
    if !clashes.is_empty() && !options.replace {
        let listing: Vec<String> = clashes
            .iter()
            .map(|(component_type, name)| format!("{component_type} '{name}'"))
            .collect();
        bail!(
            "refusing to overwrite existing components: {} (use --replace)",
            listing.join(", ")
        );
    }

    let mut items = Vec::new();
    for item in scanned {
        install_item(registry, &item)?;
        items.push(PackageItem {
            component_type: item.component_type,
            name: item.name.clone(),
            hash: registry.get_hash(item.component_type, &item.name)?,
        });
    }
    Ok(items)
}

fn install_item(registry: &Registry, item: &ScannedItem) -> Result<()> {
    match registry.add(item.component_type, &item.name, &item.path, true) {
        Ok(_) => Ok(()),
        Err(err) => {
            warn!(
                kind = item.component_type.as_str(),
                name = item.name.as_str(),
                "failed to install item: {err:#}"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
