//! Package index (`packages.yaml`) — provenance for bulk-installed
//! components.
//!
//! ```yaml
//! packages:
//!   ex:
//!     source: git
//!     url: https://github.com/user/ex.git
//!     commit: 4f2a9c1d…
//!     installed: "2026-08-01"
//!     items:
//!       - { type: hook, name: notify.py, hash: 9b2d… }
//! ```
//!
//! The index is rewritten wholesale on save; concurrent writers can lose
//! updates but never corrupt the file (stage-then-rename).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use hawk_core::{ComponentType, HawkError};

/// Inferred provenance of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Git,
    Local,
    Manual,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Git => "git",
            SourceKind::Local => "local",
            SourceKind::Manual => "manual",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One component owned by a package, with its content hash at install
/// time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageItem {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub name: String,
    pub hash: String,
}

/// A recorded package.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// ISO date of the last install or update.
    #[serde(default)]
    pub installed: String,
    #[serde(default)]
    pub items: Vec<PackageItem>,
}

impl PackageEntry {
    /// Infer the source kind, tolerant of hand-edited indices: a
    /// non-empty `url` wins even when `path` is also present; an empty
    /// `url` classifies as manual.
    pub fn source_kind(&self) -> SourceKind {
        match &self.url {
            Some(url) if !url.is_empty() => SourceKind::Git,
            Some(_) => SourceKind::Manual,
            None => {
                if self.path.is_some() {
                    SourceKind::Local
                } else {
                    SourceKind::Manual
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IndexFile {
    #[serde(default)]
    packages: BTreeMap<String, PackageEntry>,
}

/// Loaded package index bound to its file path.
#[derive(Debug, Clone)]
pub struct PackageIndex {
    path: PathBuf,
    packages: BTreeMap<String, PackageEntry>,
}

impl PackageIndex {
    pub fn load(path: &Path) -> Result<Self> {
        let packages = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read package index: {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                let file: IndexFile = serde_yaml::from_str(&content).with_context(|| {
                    format!("failed to parse package index: {}", path.display())
                })?;
                file.packages
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            packages,
        })
    }

    /// Persist the whole index atomically.
    pub fn save(&self) -> Result<()> {
        let file = IndexFile {
            packages: self.packages.clone(),
        };
        let content = serde_yaml::to_string(&file).context("failed to serialize package index")?;
        let dir = self
            .path
            .parent()
            .with_context(|| format!("index path has no parent: {}", self.path.display()))?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".packages-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .with_context(|| format!("failed to stage index in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .context("failed to write package index")?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to install {}", self.path.display()))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    /// Record (create or update) a package entry.
    ///
    /// Changing the source *type* of an existing package is rejected;
    /// the user must remove and re-import explicitly.
    pub fn record(&mut self, name: &str, entry: PackageEntry) -> Result<()> {
        if let Some(existing) = self.packages.get(name) {
            let old_kind = existing.source_kind();
            let new_kind = entry.source_kind();
            if old_kind != new_kind {
                bail!(HawkError::SourceTypeConflict {
                    name: name.to_string(),
                    existing: old_kind.to_string(),
                    new: new_kind.to_string(),
                });
            }
        }
        self.packages.insert(name.to_string(), entry);
        Ok(())
    }

    /// Drop a package entry, returning the items it owned. The caller
    /// is responsible for removing those items from the registry.
    pub fn remove(&mut self, name: &str) -> Result<Vec<PackageItem>> {
        match self.packages.remove(name) {
            Some(entry) => Ok(entry.items),
            None => bail!(HawkError::PackageNotFound(name.to_string())),
        }
    }

    /// Reverse lookup: which package owns `(type, name)`.
    pub fn owner_of(&self, component_type: ComponentType, name: &str) -> Option<&str> {
        self.packages.iter().find_map(|(pkg, entry)| {
            entry
                .items
                .iter()
                .any(|item| item.component_type == component_type && item.name == name)
                .then_some(pkg.as_str())
        })
    }
}

/// Default package name for a git URL: last path segment with `.git`
/// stripped.
pub fn package_name_from_url(url: &str) -> Result<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .with_context(|| format!("cannot derive a package name from '{url}'"))?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        bail!("cannot derive a package name from '{url}'");
    }
    Ok(name.to_string())
}

/// Today's date in the index's ISO form.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
