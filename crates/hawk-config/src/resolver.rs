//! Scope chain construction and effective-state resolution.
//!
//! The chain for a working directory is: the global layer, then every
//! registered directory that is an ancestor of (or equal to) the cwd
//! ordered shallowest to deepest, then — when the cwd itself is not
//! registered but carries `.hawk/config.yaml` — the cwd as the innermost
//! layer. Layers that exist but are empty still count; they just
//! contribute nothing.
//!
//! Per component type and tool, the effective list is
//! `((global ∪ Σ chain) − tools.<id>.exclude) ∪ tools.<id>.extra` with
//! stable order and first-occurrence dedup. Exclusions apply after the
//! union but before tool extras, so an extra can re-add an excluded name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use hawk_core::{ComponentType, HawkError};

use crate::layer::{ConfigLayer, Profile, TypeLists};
use crate::paths;
use crate::projects::ProjectsIndex;

/// Where a layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    Global,
    Directory(PathBuf),
}

/// One loaded layer in the chain.
#[derive(Debug, Clone)]
pub struct Layer {
    pub source: LayerSource,
    pub config: ConfigLayer,
}

/// The ordered chain of layers applying to a cwd.
#[derive(Debug, Clone)]
pub struct ScopeChain {
    pub layers: Vec<Layer>,
    /// Named presets, read from the global layer.
    pub profiles: BTreeMap<String, Profile>,
}

impl ScopeChain {
    /// The innermost directory scope, if any — where project-level sync
    /// artifacts anchor.
    pub fn project_dir(&self) -> Option<&Path> {
        self.layers.iter().rev().find_map(|layer| match &layer.source {
            LayerSource::Directory(dir) => Some(dir.as_path()),
            LayerSource::Global => None,
        })
    }
}

/// Effective component lists for one `(cwd, tool)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedState {
    /// Whether the tool is enabled at all for this scope.
    pub enabled: bool,
    components: TypeLists,
}

impl ResolvedState {
    /// Assemble a state directly, bypassing config files.
    pub fn from_lists(enabled: bool, components: TypeLists) -> Self {
        Self {
            enabled,
            components,
        }
    }

    pub fn get(&self, component_type: ComponentType) -> &[String] {
        self.components.get(component_type)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Stable digest input: every `(type, name)` pair in processing
    /// order.
    pub fn entries(&self) -> Vec<(ComponentType, &str)> {
        let mut out = Vec::new();
        for component_type in hawk_core::types::ALL_TYPES {
            for name in self.components.get(component_type) {
                out.push((component_type, name.as_str()));
            }
        }
        out
    }
}

/// Build the scope chain for `cwd`.
pub fn build_chain(config_root: &Path, cwd: &Path) -> Result<ScopeChain> {
    let global = ConfigLayer::load(&paths::global_config_file(config_root))?;
    let profiles = global.profiles.clone();

    let mut layers = vec![Layer {
        source: LayerSource::Global,
        config: global,
    }];

    let index = ProjectsIndex::load(&paths::projects_file(config_root))?;
    for dir in index.ancestors_of(cwd) {
        let config = ConfigLayer::load(&paths::scope_config_file(&dir))?;
        layers.push(Layer {
            source: LayerSource::Directory(dir),
            config,
        });
    }

    // Unregistered-local fallback: a cwd with its own scope file joins
    // the chain as the innermost layer.
    if !index.is_registered(cwd) {
        let local = paths::scope_config_file(cwd);
        if local.exists() {
            debug!(dir = %cwd.display(), "using unregistered local scope");
            layers.push(Layer {
                source: LayerSource::Directory(cwd.to_path_buf()),
                config: ConfigLayer::load(&local)?,
            });
        }
    }

    Ok(ScopeChain { layers, profiles })
}

/// Build a chain containing only the global layer.
pub fn build_global_chain(config_root: &Path) -> Result<ScopeChain> {
    let global = ConfigLayer::load(&paths::global_config_file(config_root))?;
    let profiles = global.profiles.clone();
    Ok(ScopeChain {
        layers: vec![Layer {
            source: LayerSource::Global,
            config: global,
        }],
        profiles,
    })
}

/// Resolve the effective state for `(cwd, tool)`.
pub fn resolve(config_root: &Path, cwd: &Path, tool: &str) -> Result<ResolvedState> {
    let chain = build_chain(config_root, cwd)?;
    resolve_chain(&chain, tool)
}

/// Resolve the effective state for the global scope only.
pub fn resolve_global(config_root: &Path, tool: &str) -> Result<ResolvedState> {
    let chain = build_global_chain(config_root)?;
    resolve_chain(&chain, tool)
}

/// Merge a loaded chain into the effective state for one tool.
pub fn resolve_chain(chain: &ScopeChain, tool: &str) -> Result<ResolvedState> {
    let mut merged = TypeLists::default();
    let mut enabled: Option<bool> = None;
    let mut excludes = TypeLists::default();
    let mut extras = TypeLists::default();

    for layer in &chain.layers {
        let overlay = profile_overlay(&layer.config, &chain.profiles)?;

        for component_type in hawk_core::types::ALL_TYPES {
            let target = merged.get_mut(component_type);
            for name in layer.config.global.get(component_type) {
                if !target.contains(name) {
                    target.push(name.clone());
                }
            }
            if let Some(profile) = &overlay {
                for name in profile.global.get(component_type) {
                    if !target.contains(name) {
                        target.push(name.clone());
                    }
                }
            }
        }

        if let Some(overrides) = layer.config.tools.get(tool) {
            if let Some(flag) = overrides.enabled {
                enabled = Some(flag);
            }
            for component_type in hawk_core::types::ALL_TYPES {
                let list_override = overrides.get(component_type);
                excludes
                    .get_mut(component_type)
                    .extend(list_override.exclude.iter().cloned());
                for name in &list_override.extra {
                    let target = extras.get_mut(component_type);
                    if !target.contains(name) {
                        target.push(name.clone());
                    }
                }
            }
        }
    }

    let mut components = TypeLists::default();
    for component_type in hawk_core::types::ALL_TYPES {
        let exclude = excludes.get(component_type);
        let target = components.get_mut(component_type);
        for name in merged.get(component_type) {
            if !exclude.contains(name) && !target.contains(name) {
                target.push(name.clone());
            }
        }
        // Tool extras append after exclusion, so they can re-add names.
        for name in extras.get(component_type) {
            if !target.contains(name) {
                target.push(name.clone());
            }
        }
    }

    Ok(ResolvedState {
        enabled: enabled.unwrap_or(true),
        components,
    })
}

fn profile_overlay(
    layer: &ConfigLayer,
    profiles: &BTreeMap<String, Profile>,
) -> Result<Option<Profile>> {
    let Some(name) = &layer.profile else {
        return Ok(None);
    };
    let profile = profiles
        .get(name)
        .ok_or_else(|| HawkError::ProfileNotFound(name.clone()))?;
    if let Some(nested) = &profile.profile {
        return Err(HawkError::ProfileCycle {
            profile: name.clone(),
            nested: nested.clone(),
        }
        .into());
    }
    Ok(Some(profile.clone()))
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
