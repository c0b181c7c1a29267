//! The on-disk component store.
//!
//! One fixed subdirectory per component type. All mutations stage the
//! payload inside the target type directory under a dot-prefixed name
//! and rename into place, so readers only ever observe the pre- or
//! post-state. Replace moves the old payload aside to a stash and
//! restores it when installation fails.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use hawk_core::{ComponentType, HawkError, content_hash, validate_name};

/// Handle on a registry root (`<config_root>/registry`).
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn type_dir(&self, component_type: ComponentType) -> PathBuf {
        self.root.join(component_type.subdir())
    }

    /// Path the payload lives at (whether or not it exists).
    pub fn payload_path(&self, component_type: ComponentType, name: &str) -> PathBuf {
        self.type_dir(component_type)
            .join(component_type.payload_file_name(name))
    }

    pub fn exists(&self, component_type: ComponentType, name: &str) -> bool {
        self.payload_path(component_type, name).exists()
    }

    /// Component names of one type, lexicographic.
    pub fn list(&self, component_type: ComponentType) -> Result<Vec<String>> {
        let dir = self.type_dir(component_type);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read {}", dir.display()))?
        {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(name) = component_type.name_from_payload(&file_name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Content hash of a stored component.
    pub fn get_hash(&self, component_type: ComponentType, name: &str) -> Result<String> {
        let path = self.payload_path(component_type, name);
        if !path.exists() {
            bail!(HawkError::ComponentNotFound {
                kind: component_type.to_string(),
                name: name.to_string(),
            });
        }
        content_hash(&path).with_context(|| format!("failed to hash {}", path.display()))
    }

    /// Subset of `items` already present in the registry.
    pub fn check_clashes(
        &self,
        items: &[(ComponentType, String)],
    ) -> Vec<(ComponentType, String)> {
        items
            .iter()
            .filter(|(component_type, name)| self.exists(*component_type, name))
            .cloned()
            .collect()
    }

    /// Install a payload under `(type, name)`.
    ///
    /// The source is staged inside the type directory, then renamed into
    /// place. With `replace`, an existing payload is stashed first and
    /// restored if installation fails — a half-failed add leaves either
    /// the prior state or the fully new state.
    pub fn add(
        &self,
        component_type: ComponentType,
        name: &str,
        source: &Path,
        replace: bool,
    ) -> Result<PathBuf> {
        validate_name(name)?;
        if !source.exists() {
            bail!("source path does not exist: {}", source.display());
        }

        let target = self.payload_path(component_type, name);
        let existed = target.exists();
        if existed && !replace {
            bail!(HawkError::AlreadyExists {
                kind: component_type.to_string(),
                name: name.to_string(),
            });
        }

        let type_dir = self.type_dir(component_type);
        std::fs::create_dir_all(&type_dir)
            .with_context(|| format!("failed to create {}", type_dir.display()))?;

        let file_name = component_type.payload_file_name(name);
        let stage = type_dir.join(format!(".stage-{file_name}"));
        let stash = type_dir.join(format!(".stash-{file_name}"));
        remove_any(&stage).ok();
        remove_any(&stash).ok();

        copy_payload(source, &stage)
            .with_context(|| format!("failed to stage {}", source.display()))?;

        if existed {
            std::fs::rename(&target, &stash)
                .with_context(|| format!("failed to stash {}", target.display()))?;
        }

        match std::fs::rename(&stage, &target) {
            Ok(()) => {
                if existed {
                    remove_any(&stash).with_context(|| {
                        format!("failed to drop stash {}", stash.display())
                    })?;
                }
                debug!(
                    kind = component_type.as_str(),
                    name, "installed component payload"
                );
                Ok(target)
            }
            Err(err) => {
                // Roll back: restore the stashed payload, drop the stage.
                if existed {
                    let _ = std::fs::rename(&stash, &target);
                }
                let _ = remove_any(&stage);
                Err(err).with_context(|| format!("failed to install {}", target.display()))
            }
        }
    }

    /// Remove a component. Idempotent; returns whether anything was
    /// removed.
    pub fn remove(&self, component_type: ComponentType, name: &str) -> Result<bool> {
        let path = self.payload_path(component_type, name);
        if !path.exists() {
            return Ok(false);
        }
        remove_any(&path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    }
}

fn remove_any(path: &Path) -> std::io::Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Copy a file or directory tree.
fn copy_payload(source: &Path, dest: &Path) -> Result<()> {
    let meta = std::fs::metadata(source)
        .with_context(|| format!("failed to stat {}", source.display()))?;
    if meta.is_dir() {
        copy_dir(source, dest)
    } else {
        std::fs::copy(source, dest)
            .with_context(|| format!("failed to copy {}", source.display()))?;
        Ok(())
    }
}

fn copy_dir(source: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;
    for entry in std::fs::read_dir(source)
        .with_context(|| format!("failed to read {}", source.display()))?
    {
        let entry = entry?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)
                .with_context(|| format!("failed to copy {}", from.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
