//! Registered directory index (`projects.yaml`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directories registered as scope anchors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectsIndex {
    #[serde(default)]
    pub projects: Vec<PathBuf>,
}

impl ProjectsIndex {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read projects index: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse projects index: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize projects index")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write projects index: {}", path.display()))?;
        Ok(())
    }

    /// Register a directory. Returns false when it was already present.
    pub fn register(&mut self, dir: &Path) -> bool {
        let dir = normalize(dir);
        if self.projects.contains(&dir) {
            return false;
        }
        self.projects.push(dir);
        true
    }

    /// Unregister a directory. Returns false when it was not present.
    pub fn unregister(&mut self, dir: &Path) -> bool {
        let dir = normalize(dir);
        let before = self.projects.len();
        self.projects.retain(|p| p != &dir);
        self.projects.len() != before
    }

    pub fn is_registered(&self, dir: &Path) -> bool {
        self.projects.contains(&normalize(dir))
    }

    /// Registered directories that are ancestors of (or equal to) `cwd`,
    /// ordered shallowest to deepest.
    pub fn ancestors_of(&self, cwd: &Path) -> Vec<PathBuf> {
        let cwd = normalize(cwd);
        let mut matches: Vec<PathBuf> = self
            .projects
            .iter()
            .filter(|dir| cwd.starts_with(dir))
            .cloned()
            .collect();
        matches.sort_by_key(|dir| dir.components().count());
        matches
    }
}

/// Normalize to an absolute path without touching the filesystem (the
/// directory may not exist yet when registering ahead of time).
fn normalize(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .unwrap_or_else(|_| dir.to_path_buf())
    }
}
